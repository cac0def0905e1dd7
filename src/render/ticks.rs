//! Tick placement and tick-label formatting.

use num_format::{Locale, ToFormattedString};

use crate::style::Scale;

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisTicks {
    pub major: Vec<Tick>,
    pub minor: Vec<f64>,
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'),
    }
}

/// A "nice" major step (1, 2 or 5 times a power of ten) for about `target` intervals.
pub fn nice_step(range: f64, target: usize) -> f64 {
    let raw = range.abs() / target.max(1) as f64;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 2.5 {
        2.5
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

pub fn is_major_tick(v: f64, step: f64) -> bool {
    if step == 0.0 {
        return true;
    }
    ((v / step).round() * step - v).abs() < step * 1e-9
}

/// Multiples of `step` inside `[lo, hi]`.
fn multiples(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let eps = step * 1e-9;
    let start = ((lo - eps) / step).ceil() as i64;
    let end = ((hi + eps) / step).floor() as i64;
    if end < start || end - start > 10_000 {
        return Vec::new();
    }
    (start..=end)
        .map(|k| {
            let v = k as f64 * step;
            // avoid "-0"
            if v.abs() < eps { 0.0 } else { v }
        })
        .collect()
}

/// Digits after the decimal point needed to show every value exactly (max 6).
pub fn decimals_for(values: &[f64]) -> usize {
    (0..=6)
        .find(|d| {
            let m = 10f64.powi(*d as i32);
            values
                .iter()
                .all(|v| ((v * m).round() - v * m).abs() < 1e-6 * m.max(1.0))
        })
        .unwrap_or(6)
}

fn superscript(n: i32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    let mut s = String::new();
    if n < 0 {
        s.push('⁻');
    }
    for c in n.unsigned_abs().to_string().chars() {
        if let Some(d) = c.to_digit(10) {
            s.push(DIGITS[d as usize]);
        }
    }
    s
}

/// `10ⁿ`, with a leading minus for negative values.
pub fn power_label(sign: f64, exp: i32) -> String {
    let base = format!("10{}", superscript(exp));
    if sign < 0.0 { format!("−{base}") } else { base }
}

/// Plain decimal formatting with optional locale grouping. Uses the Unicode minus sign.
pub fn format_value(v: f64, decimals: usize, locale: Option<&str>) -> String {
    let text = format!("{:.*}", decimals, v.abs());
    let negative = v < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0');
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };
    let (int_part, sep) = match locale {
        Some(tag) => {
            let (loc, sep) = map_locale(tag);
            let grouped = int_part
                .parse::<u64>()
                .map(|n| n.to_formatted_string(loc))
                .unwrap_or(int_part);
            (grouped, sep)
        }
        None => (int_part, '.'),
    };
    let mut out = String::new();
    if negative {
        out.push('−');
    }
    out.push_str(&int_part);
    if let Some(f) = frac_part {
        out.push(sep);
        out.push_str(&f);
    }
    out
}

/// Scientific label such as `2.5e6`, used when magnitudes make plain labels unreadable.
fn format_scientific(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let exp = v.abs().log10().floor() as i32;
    let mant = v / 10f64.powi(exp);
    let mant_txt = format_value(mant, decimals_for(&[mant]).min(3), None);
    format!("{mant_txt}e{exp}")
}

/// Labels for linear ticks sharing a common step.
pub fn format_linear(values: &[f64], step: f64, locale: Option<&str>) -> Vec<String> {
    let max_abs = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tiny = max_abs > 0.0 && max_abs < 1e-3;
    if max_abs >= 1e7 || tiny {
        return values.iter().map(|v| format_scientific(*v)).collect();
    }
    let decimals = if step > 0.0 && step < 1.0 {
        decimals_for(&[step]).max((-step.log10().floor()) as usize)
    } else {
        decimals_for(values).min(2)
    };
    values
        .iter()
        .map(|v| format_value(*v, decimals, locale))
        .collect()
}

fn linear_ticks(lo: f64, hi: f64, target: usize, minor: bool, locale: Option<&str>) -> AxisTicks {
    let step = nice_step(hi - lo, target);
    let values = multiples(lo, hi, step);
    let labels = format_linear(&values, step, locale);
    let minor_values = if minor {
        let mant = step / 10f64.powf(step.log10().floor());
        let ndiv = if (mant - 2.0).abs() < 1e-9 { 4.0 } else { 5.0 };
        multiples(lo, hi, step / ndiv)
            .into_iter()
            .filter(|v| !is_major_tick(*v, step))
            .collect()
    } else {
        Vec::new()
    };
    AxisTicks {
        major: values
            .into_iter()
            .zip(labels)
            .map(|(value, label)| Tick { value, label })
            .collect(),
        minor: minor_values,
    }
}

fn log_ticks(lo: f64, hi: f64, target: usize, minor: bool, locale: Option<&str>) -> AxisTicks {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let d0 = lo.log10().floor() as i32;
    let d1 = hi.log10().ceil() as i32;
    let stride = (((d1 - d0) as f64) / target.max(1) as f64).ceil().max(1.0) as i32;
    let inside = |v: f64| v >= lo * (1.0 - 1e-9) && v <= hi * (1.0 + 1e-9);
    let major: Vec<Tick> = (d0..=d1)
        .filter(|k| (k - d0) % stride == 0)
        .map(|k| (k, 10f64.powi(k)))
        .filter(|(_, v)| inside(*v))
        .map(|(k, v)| Tick {
            value: v,
            label: power_label(1.0, k),
        })
        .collect();
    if major.len() < 2 {
        // less than a decade: label in data units instead
        return linear_ticks(lo, hi, target, minor, locale);
    }
    let minor_values = if minor && stride == 1 {
        (d0..=d1)
            .flat_map(|k| (2..=9).map(move |m| m as f64 * 10f64.powi(k)))
            .filter(|v| inside(*v))
            .collect()
    } else {
        Vec::new()
    };
    AxisTicks {
        major,
        minor: minor_values,
    }
}

fn symlog_ticks(lo: f64, hi: f64, target: usize) -> AxisTicks {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let mut candidates: Vec<(f64, i32, f64)> = vec![(0.0, 0, 0.0)];
    let top = hi.abs().max(lo.abs()).max(1.0).log10().ceil() as i32;
    for k in 0..=top {
        let v = 10f64.powi(k) * Scale::SYMLOG_LINTHRESH;
        candidates.push((v, k, 1.0));
        candidates.push((-v, k, -1.0));
    }
    let mut inside: Vec<(f64, i32, f64)> = candidates
        .into_iter()
        .filter(|(v, _, _)| *v >= lo - 1e-9 && *v <= hi + 1e-9)
        .collect();
    inside.sort_by(|a, b| a.0.total_cmp(&b.0));
    let stride = (inside.len() as f64 / (target.max(1) + 1) as f64).ceil().max(1.0) as usize;
    let major = inside
        .into_iter()
        .filter(|(_, k, s)| *s == 0.0 || (*k as usize) % stride == 0)
        .map(|(v, k, s)| Tick {
            value: v,
            label: if s == 0.0 { "0".to_string() } else { power_label(s, k) },
        })
        .collect();
    AxisTicks {
        major,
        minor: Vec::new(),
    }
}

/// Automatic ticks for an axis showing `limits` on `scale`.
pub fn locate(
    scale: Scale,
    limits: (f64, f64),
    target: usize,
    minor: bool,
    locale: Option<&str>,
) -> AxisTicks {
    let (lo, hi) = (limits.0.min(limits.1), limits.0.max(limits.1));
    match scale {
        Scale::Linear => linear_ticks(lo, hi, target, minor, locale),
        Scale::Log if lo > 0.0 => log_ticks(lo, hi, target, minor, locale),
        Scale::Log => linear_ticks(lo, hi, target, minor, locale),
        Scale::SymLog => symlog_ticks(lo, hi, target),
    }
}

/// Ticks at fixed positions, labelled by `labels` or by formatting the values.
pub fn fixed(values: &[f64], labels: Option<&[String]>, locale: Option<&str>) -> AxisTicks {
    let formatted: Vec<String> = match labels {
        Some(l) => l.to_vec(),
        None => {
            let d = decimals_for(values).min(4);
            values.iter().map(|v| format_value(*v, d, locale)).collect()
        }
    };
    AxisTicks {
        major: values
            .iter()
            .zip(formatted)
            .map(|(value, label)| Tick {
                value: *value,
                label,
            })
            .collect(),
        minor: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(t: &AxisTicks) -> Vec<f64> {
        t.major.iter().map(|t| t.value).collect()
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(10.0, 5), 2.0);
        assert!((nice_step(1.0, 4) - 0.25).abs() < 1e-12);
        assert_eq!(nice_step(100.0, 4), 25.0);
        assert_eq!(nice_step(7.0, 7), 1.0);
    }

    #[test]
    fn linear_ticks_cover_range_with_labels() {
        let t = locate(Scale::Linear, (0.0, 10.0), 5, false, None);
        assert_eq!(values(&t), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(t.major[1].label, "2");
        let t = locate(Scale::Linear, (-1.0, 1.0), 4, false, None);
        assert_eq!(t.major[0].label, "−1.0");
    }

    #[test]
    fn log_ticks_are_decades() {
        let t = locate(Scale::Log, (1.0, 1000.0), 6, true, None);
        assert_eq!(values(&t), vec![1.0, 10.0, 100.0, 1000.0]);
        assert_eq!(t.major[2].label, "10²");
        assert!(t.minor.contains(&20.0));
    }

    #[test]
    fn locale_groups_thousands() {
        assert_eq!(format_value(12345.0, 0, Some("en")), "12,345");
        assert_eq!(format_value(12345.5, 1, Some("de")), "12.345,5");
        assert_eq!(format_value(12345.0, 0, None), "12345");
    }

    #[test]
    fn fixed_ticks_keep_given_labels() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let t = fixed(&[0.0, 1.0], Some(&labels), None);
        assert_eq!(t.major[1].label, "b");
        let t = fixed(&[0.5, 1.25], None, None);
        assert_eq!(t.major[1].label, "1.25");
    }
}
