use chrono::NaiveDate;

/// Display settings shared by the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    pub currency_symbol: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
        }
    }
}

impl DisplayFormat {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn currency(&self, amount: f64) -> String {
        format_currency(&self.currency_symbol, amount)
    }
}

/// `1250.5` -> `$1,250.50`
pub fn format_currency(symbol: &str, amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}

/// Percentage with one decimal; an undefined ratio renders as `n/a`.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
