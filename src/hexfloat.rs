//! C99 `%a`-style hexadecimal floating point literals, the wire format
//! `float` operands use both on the way in (program source) and the
//! way out (`WRITE`/`DPRINT` of a float value).

/// Formats `f` the way the reference implementation's `float.hex()`
/// does: a sign, `0x`, one leading hex digit (`1` for normal values,
/// `0` for zero and subnormals), exactly 13 fractional hex digits,
/// `p`, a signed decimal exponent.
pub fn format(f: f64) -> String {
    if f == 0.0 {
        return if f.is_sign_negative() {
            "-0x0.0000000000000p+0".to_string()
        } else {
            "0x0.0000000000000p+0".to_string()
        };
    }
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f < 0.0 { "-inf".to_string() } else { "inf".to_string() };
    }

    let bits = f.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let raw_exp = ((bits >> 52) & 0x7ff) as i64;
    let mantissa = bits & 0x000f_ffff_ffff_ffff;

    let (leading, exp) = if raw_exp == 0 {
        (0u64, -1022i64)
    } else {
        (1u64, raw_exp - 1023)
    };

    format!(
        "{}0x{}.{:013x}p{}{}",
        sign,
        leading,
        mantissa,
        if exp >= 0 { "+" } else { "-" },
        exp.abs()
    )
}

/// Parses a C99 hex float literal (`[sign] 0x hexdigits [. hexdigits] p [sign] decdigits`).
/// Returns `None` on any deviation from that grammar.
pub fn parse(text: &str) -> Option<f64> {
    let text = text.trim();

    let (sign, rest) = if let Some(r) = text.strip_prefix('-') {
        (-1.0, r)
    } else if let Some(r) = text.strip_prefix('+') {
        (1.0, r)
    } else {
        (1.0, text)
    };

    let rest = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))?;

    let p_pos = rest.find(|c| c == 'p' || c == 'P')?;
    let (mantissa_part, exp_part) = (&rest[..p_pos], &rest[p_pos + 1..]);
    if exp_part.is_empty() {
        return None;
    }
    let exponent: i32 = exp_part.parse().ok()?;

    let (int_part, frac_part) = match mantissa_part.find('.') {
        Some(dot) => (&mantissa_part[..dot], &mantissa_part[dot + 1..]),
        None => (mantissa_part, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value = 0f64;
    for c in int_part.chars() {
        let digit = c.to_digit(16)? as f64;
        value = value * 16.0 + digit;
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        let digit = c.to_digit(16)? as f64;
        value += digit * scale;
        scale /= 16.0;
    }

    Some(sign * value * 2f64.powi(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_whole_numbers() {
        for n in &[0.0, 1.0, -1.0, 3.0, 106.0, 42.5] {
            let text = format(*n);
            assert_eq!(parse(&text), Some(*n), "round trip of {} via {}", n, text);
        }
    }

    #[test]
    fn parses_plain_examples() {
        assert_eq!(parse("0x1p+0"), Some(1.0));
        assert_eq!(parse("0x1.8p+1"), Some(3.0));
        assert_eq!(parse("-0x1p+1"), Some(-2.0));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse("1.5"), None);
        assert_eq!(parse("0x1.8"), None);
        assert_eq!(parse(""), None);
    }
}
