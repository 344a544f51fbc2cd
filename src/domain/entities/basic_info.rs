use serde::Serialize;

/// Point-in-time company fundamentals, fetched fresh for every prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicInfo {
    pub name: Option<String>,
    pub sectors: Vec<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub high_52_week: Option<f64>,
    pub low_52_week: Option<f64>,
    pub eps: Option<f64>,
}

impl BasicInfo {
    /// `(attribute, rendered value)` pairs in declaration order. Absent values
    /// render as `None`.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let sectors = if self.sectors.is_empty() {
            "None".to_string()
        } else {
            self.sectors.join(", ")
        };
        vec![
            ("name", self.name.clone().unwrap_or_else(|| "None".into())),
            ("sectors", sectors),
            ("market_cap", raw(self.market_cap)),
            ("pe_ratio", raw(self.pe_ratio)),
            ("dividend_yield", raw(self.dividend_yield)),
            ("beta", raw(self.beta)),
            ("high_52_week", raw(self.high_52_week)),
            ("low_52_week", raw(self.low_52_week)),
            ("eps", raw(self.eps)),
        ]
    }
}

fn raw(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => "None".into(),
    }
}
