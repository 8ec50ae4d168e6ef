//! Plain-text rendering of projection and comparison results for the terminal.

use std::convert::Infallible;
use std::io::{self, Write};
use std::str::FromStr;

use crate::core::{ComparisonResult, ProjectionResult, Winner};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Currency {
    Usd,
    Eur,
    #[default]
    Ars,
    Mxn,
    Clp,
    Cop,
    Brl,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SymbolPlacement {
    Prefix,
    PrefixSpaced,
    SuffixSpaced,
}

#[derive(Copy, Clone, Debug)]
struct MoneyStyle {
    symbol: &'static str,
    group_separator: char,
    placement: SymbolPlacement,
}

impl Currency {
    /// Case-insensitive lookup; unknown codes fall back to US dollars.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "EUR" => Currency::Eur,
            "ARS" => Currency::Ars,
            "MXN" => Currency::Mxn,
            "CLP" => Currency::Clp,
            "COP" => Currency::Cop,
            "BRL" => Currency::Brl,
            _ => Currency::Usd,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ars => "ARS",
            Currency::Mxn => "MXN",
            Currency::Clp => "CLP",
            Currency::Cop => "COP",
            Currency::Brl => "BRL",
        }
    }

    fn style(self) -> MoneyStyle {
        let (symbol, group_separator, placement) = match self {
            Currency::Usd => ("$", ',', SymbolPlacement::Prefix),
            Currency::Eur => ("€", '.', SymbolPlacement::SuffixSpaced),
            Currency::Ars => ("$", '.', SymbolPlacement::PrefixSpaced),
            Currency::Mxn => ("$", ',', SymbolPlacement::Prefix),
            Currency::Clp => ("$", '.', SymbolPlacement::Prefix),
            Currency::Cop => ("$", '.', SymbolPlacement::PrefixSpaced),
            Currency::Brl => ("R$", '.', SymbolPlacement::PrefixSpaced),
        };
        MoneyStyle {
            symbol,
            group_separator,
            placement,
        }
    }
}

impl FromStr for Currency {
    type Err = Infallible;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(Currency::from_code(code))
    }
}

/// Formats an amount rounded to whole currency units in the currency's local style.
pub fn format_money(value: f64, currency: Currency) -> String {
    let rounded = value.round();
    // `u64::MAX as f64` is 2^64, which itself no longer fits.
    if !rounded.is_finite() || rounded.abs() >= u64::MAX as f64 {
        return "n/a".to_string();
    }

    let style = currency.style();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = group_digits(rounded.abs() as u64, style.group_separator);

    match style.placement {
        SymbolPlacement::Prefix => format!("{sign}{}{digits}", style.symbol),
        SymbolPlacement::PrefixSpaced => format!("{sign}{} {digits}", style.symbol),
        SymbolPlacement::SuffixSpaced => format!("{sign}{digits} {}", style.symbol),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "n/a".to_string(),
    }
}

fn group_digits(value: u64, separator: char) -> String {
    let raw = value.to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
    for (idx, ch) in raw.chars().enumerate() {
        if idx > 0 && (raw.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

pub fn render_projection<W: Write>(
    out: &mut W,
    result: &ProjectionResult,
    currency: Currency,
) -> io::Result<()> {
    let money = |v: f64| format_money(v, currency);
    let breakdown = result.breakdown();

    writeln!(
        out,
        "Projection over {} years ({} months), {}",
        result.years,
        result.horizon_months,
        currency.code()
    )?;
    writeln!(out, "  Total invested:  {}", money(result.final_invested))?;
    writeln!(out, "  Interest earned: {}", money(result.final_interest))?;
    writeln!(out, "  Final balance:   {}", money(result.final_balance))?;
    writeln!(out, "  Total return:    {}", format_percent(result.return_percent))?;
    if let Some(real) = result.final_real_balance {
        writeln!(out, "  Real value:      {}", money(real))?;
    }
    writeln!(
        out,
        "  Breakdown:       invested {} / interest {}",
        format_percent(breakdown.invested_share),
        format_percent(breakdown.interest_share)
    )?;

    if result.yearly_series.is_empty() {
        return Ok(());
    }

    let with_age = result.yearly_series.iter().any(|y| y.age.is_some());
    let with_real = result.final_real_balance.is_some();

    writeln!(out)?;
    write!(out, "{:>5}", "Year")?;
    if with_age {
        write!(out, " {:>4}", "Age")?;
    }
    write!(out, " {:>18} {:>18} {:>18}", "Invested", "Interest", "Total")?;
    if with_real {
        write!(out, " {:>18}", "Real")?;
    }
    writeln!(out)?;

    for year in &result.yearly_series {
        write!(out, "{:>5}", year.year_index)?;
        if with_age {
            let age = year.age.map(|a| a.to_string()).unwrap_or_default();
            write!(out, " {age:>4}")?;
        }
        write!(
            out,
            " {:>18} {:>18} {:>18}",
            money(year.total_invested),
            money(year.interest_earned),
            money(year.total_balance)
        )?;
        if with_real {
            let real = year.real_balance.map(money).unwrap_or_default();
            write!(out, " {real:>18}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn render_comparison<W: Write>(
    out: &mut W,
    result: &ComparisonResult,
    currency: Currency,
) -> io::Result<()> {
    let money = |v: f64| format_money(v, currency);

    writeln!(out, "{:<16} {:>18} {:>18}", "", "Scenario A", "Scenario B")?;
    let a = &result.scenario_a;
    let b = &result.scenario_b;
    for (label, left, right) in [
        ("Total invested", money(a.final_invested), money(b.final_invested)),
        ("Interest earned", money(a.final_interest), money(b.final_interest)),
        ("Final balance", money(a.final_balance), money(b.final_balance)),
        (
            "Total return",
            format_percent(a.return_percent),
            format_percent(b.return_percent),
        ),
    ] {
        writeln!(out, "{label:<16} {left:>18} {right:>18}")?;
    }

    writeln!(out)?;
    match (result.winner, result.margin()) {
        (Winner::A, Some(margin)) => writeln!(out, "Scenario A wins by {}", money(margin))?,
        (Winner::B, Some(margin)) => writeln!(out, "Scenario B wins by {}", money(margin))?,
        _ => writeln!(out, "Technical tie")?,
    }

    if result.aligned_series.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{:>5} {:>18} {:>18}", "Year", "Scenario A", "Scenario B")?;
    for year in &result.aligned_series {
        let left = year.total_a.map(money).unwrap_or_else(|| "-".to_string());
        let right = year.total_b.map(money).unwrap_or_else(|| "-".to_string());
        writeln!(out, "{:>5} {left:>18} {right:>18}", year.year_index)?;
    }
    Ok(())
}
