/// Reads free-form numeric text. Thousands separators are ignored and the
/// leading numeric value is taken, so `"12g"` is `12`. Anything without a
/// usable number, or a value that is not finite, is `0`.
pub fn parse_number(input: &str) -> f64 {
    let cleaned: String = input.chars().filter(|c| *c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let prefix = &trimmed[..numeric_prefix_len(trimmed)];
    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Display form of a number: integers as-is, everything else rounded to the
/// nearest tenth. Non-finite input shows as `"0"`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }

    let shown = if n.fract() == 0.0 {
        n
    } else {
        // half-up, so -0.25 shows as -0.2
        (n * 10.0 + 0.5).floor() / 10.0
    };

    if shown == 0.0 {
        return "0".to_string();
    }
    shown.to_string()
}

pub fn sanitize_integer(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Keeps digits and periods. Extra periods collapse into the fractional part:
/// `"1.2.3"` becomes `"1.23"`.
pub fn sanitize_decimal(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match kept.split_once('.') {
        Some((whole, rest)) if rest.contains('.') => format!("{whole}.{}", rest.replace('.', "")),
        _ => kept,
    }
}

fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        end = frac_end;
    }
    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    end
}

/// Serde helpers that keep a hand-edited or older state file loadable.
pub(crate) mod lenient {
    use super::parse_number;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64().filter(|x| x.is_finite()).unwrap_or(0.0),
            Some(Value::String(s)) => parse_number(&s),
            _ => 0.0,
        })
    }

    pub fn whole<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(round_goal(number(deserializer)?))
    }

    /// Integer milliseconds from a number, a float or numeric text.
    pub fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(whole) => return Ok(whole),
                None => n.as_f64().unwrap_or(0.0),
            },
            Some(Value::String(s)) => parse_number(&s),
            _ => 0.0,
        };
        // saturating cast; NaN is already ruled out
        Ok(value.trunc() as i64)
    }

    /// A `null` section reads as its default instead of failing the load.
    pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Text that may be absent: `None` for `null`, blanks and non-scalars.
    pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = text(deserializer)?;
        Ok(Some(raw).filter(|t| !t.trim().is_empty()))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        })
    }

    /// Writes integral values without a fractional part.
    pub fn compact<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.fract() == 0.0 && value.abs() < 9.0e15 {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn round_goal(value: f64) -> u32 {
        value.round().clamp(0.0, f64::from(u32::MAX)) as u32
    }
}
