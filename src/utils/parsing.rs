// src/utils/parsing.rs

/// Parse de algo como: [1, 3, 224, 224]
pub fn parse_usize_list(text: &str) -> Result<Vec<usize>, String> {
    let inner = bracketed(text, "[d1, d2, ...]")?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for part in inner.split(',') {
        let p = part.trim();
        let n: usize = p.parse().map_err(|_| format!("Invalid index: {}", p))?;
        out.push(n);
    }
    Ok(out)
}

/// Parse de algo como: [1.5, 0, -2] a Vec<f64>
pub fn parse_f64_list(text: &str) -> Result<Vec<f64>, String> {
    let inner = bracketed(text, "[v1, v2, ...]")?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for part in inner.split(',') {
        let p = part.trim();
        let n: f64 = p.parse().map_err(|_| format!("Invalid float: {}", p))?;
        out.push(n);
    }
    Ok(out)
}

fn bracketed<'a>(text: &'a str, expected: &str) -> Result<&'a str, String> {
    let inner = text.trim();
    if !inner.starts_with('[') || !inner.ends_with(']') || inner.len() < 2 {
        return Err(format!("Expected {}, got: {}", expected, text));
    }
    Ok(&inner[1..inner.len() - 1]) // sin [ ]
}
