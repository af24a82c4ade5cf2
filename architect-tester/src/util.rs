use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse decimal or `0x` hexadecimal seeds, dropping duplicates but keeping order.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16)
        } else {
            token.parse::<u64>()
        }
        .with_context(|| format!("invalid seed '{token}'"))?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_skips_blanks() {
        assert_eq!(split_csv(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn seeds_accept_decimal_and_hex() {
        let tokens = split_csv("1337,0x2A,42,0XFF");
        assert_eq!(parse_seeds(&tokens).unwrap(), vec![1337, 42, 255]);
    }

    #[test]
    fn seeds_reject_garbage_and_empty_lists() {
        assert!(parse_seeds(&["twelve".to_string()]).is_err());
        assert!(parse_seeds(&[]).is_err());
    }
}
