//! `Accept` header negotiation.

use mime::Mime;

/// A media range from an `Accept` header with its quality in thousandths.
#[derive(Debug, Clone)]
struct MediaRange {
    mime: Mime,
    quality: u16,
}

impl MediaRange {
    /// 2 for `type/subtype`, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self) -> u8 {
        if self.mime.type_() == mime::STAR {
            0
        } else if self.mime.subtype() == mime::STAR {
            1
        } else {
            2
        }
    }

    fn matches(&self, offer: &str) -> bool {
        let Some((ty, subtype)) = offer.split_once('/') else {
            return false;
        };
        match self.specificity() {
            0 => true,
            1 => self.mime.type_().as_str().eq_ignore_ascii_case(ty),
            _ => {
                let base = subtype.split_once('+').map_or(subtype, |(b, _)| b);
                self.mime.type_().as_str().eq_ignore_ascii_case(ty)
                    && self.mime.subtype().as_str().eq_ignore_ascii_case(base)
                    && suffix_matches(&self.mime, subtype)
            }
        }
    }
}

/// `mime` splits `vnd.oai.openapi+json` into subtype `vnd.oai.openapi` and suffix `json`.
fn suffix_matches(range: &Mime, offer_subtype: &str) -> bool {
    let offer_suffix = offer_subtype.split_once('+').map(|(_, s)| s);
    match (range.suffix(), offer_suffix) {
        (Some(a), Some(b)) => a.as_str().eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Parse an RFC 9110 qvalue (`0`, `0.5`, `1.000`) into thousandths.
fn parse_quality(raw: &str) -> Option<u16> {
    let (int, frac) = raw.trim().split_once('.').unwrap_or((raw.trim(), ""));
    if frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let frac_value = frac
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
    match int {
        "0" => Some(frac_value),
        "1" if frac_value == 0 => Some(1000),
        _ => None,
    }
}

fn parse_accept(accept: &str) -> Vec<MediaRange> {
    accept
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let mime: Mime = match entry.parse() {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(entry, error = %e, "Ignoring unparsable Accept entry");
                    return None;
                }
            };
            let quality = match mime.get_param("q") {
                Some(q) => parse_quality(q.as_str()).unwrap_or_else(|| {
                    tracing::debug!(entry, "Malformed q value, treating as 1");
                    1000
                }),
                None => 1000,
            };
            Some(MediaRange { mime, quality })
        })
        .collect()
}

/// Pick the offer the client prefers.
///
/// Returns the index into `offers`. Each offer takes the quality of the most
/// specific range matching it. The highest quality wins; ties go to the offer
/// matched by the more specific range, then to the earlier offer. A missing,
/// empty, or fully unparsable header selects the first offer. `None` means
/// nothing offered is acceptable.
#[must_use]
pub fn select(accept: Option<&str>, offers: &[&str]) -> Option<usize> {
    if offers.is_empty() {
        return None;
    }
    let ranges = accept.map(parse_accept).unwrap_or_default();
    if ranges.is_empty() {
        return Some(0);
    }

    let mut best: Option<(usize, (u16, u8))> = None;
    for (idx, offer) in offers.iter().enumerate() {
        let Some(range) = ranges
            .iter()
            .filter(|r| r.matches(offer))
            .max_by_key(|r| r.specificity())
        else {
            continue;
        };
        if range.quality == 0 {
            continue;
        }
        let rank = (range.quality, range.specificity());
        if best.is_none_or(|(_, b)| rank > b) {
            best = Some((idx, rank));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const OFFERS: [&str; 4] = [
        "application/vnd.oai.openapi",
        "application/yaml",
        "application/vnd.oai.openapi+json",
        "application/json",
    ];

    #[test]
    fn missing_or_empty_header_selects_first_offer() {
        assert_eq!(select(None, &OFFERS), Some(0));
        assert_eq!(select(Some(""), &OFFERS), Some(0));
        assert_eq!(select(Some("*/*"), &OFFERS), Some(0));
    }

    #[test]
    fn exact_match_wins() {
        assert_eq!(select(Some("application/json"), &OFFERS), Some(3));
        assert_eq!(select(Some("application/yaml"), &OFFERS), Some(1));
        assert_eq!(
            select(Some("application/vnd.oai.openapi+json"), &OFFERS),
            Some(2)
        );
    }

    #[test]
    fn suffix_distinguishes_vendor_types() {
        assert_eq!(select(Some("application/vnd.oai.openapi"), &OFFERS), Some(0));
    }

    #[test]
    fn quality_orders_preferences() {
        assert_eq!(
            select(
                Some("application/yaml;q=0.5, application/json;q=0.9"),
                &OFFERS
            ),
            Some(3)
        );
    }

    #[test]
    fn more_specific_range_sets_quality() {
        // application/* would admit yaml, but yaml is explicitly excluded.
        assert_eq!(
            select(
                Some("application/*;q=0.8, application/vnd.oai.openapi;q=0, application/yaml;q=0"),
                &OFFERS
            ),
            Some(2)
        );
    }

    #[test]
    fn named_type_beats_wildcard_at_equal_quality() {
        assert_eq!(select(Some("*/*, application/json"), &OFFERS), Some(3));
        assert_eq!(select(Some("application/*, application/json"), &OFFERS), Some(3));
        // Quality still dominates specificity
        assert_eq!(select(Some("*/*, application/json;q=0.5"), &OFFERS), Some(0));
    }

    #[test]
    fn malformed_quality_counts_as_one() {
        assert_eq!(select(Some("application/json;q=abc"), &OFFERS), Some(3));
        assert_eq!(
            select(Some("application/yaml;q=0.9, application/json;q=2"), &OFFERS),
            Some(3)
        );
    }

    #[test]
    fn browser_accept_falls_back_to_wildcard() {
        let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert_eq!(select(Some(accept), &OFFERS), Some(0));
    }

    #[test]
    fn unacceptable_returns_none() {
        assert_eq!(select(Some("text/html"), &OFFERS), None);
        assert_eq!(select(Some("application/json;q=0"), &["application/json"]), None);
    }

    #[test]
    fn quality_parsing() {
        assert_eq!(parse_quality("1"), Some(1000));
        assert_eq!(parse_quality("1.000"), Some(1000));
        assert_eq!(parse_quality("0.5"), Some(500));
        assert_eq!(parse_quality("0.123"), Some(123));
        assert_eq!(parse_quality("0"), Some(0));
        assert_eq!(parse_quality("1.5"), None);
        assert_eq!(parse_quality("0.1234"), None);
        assert_eq!(parse_quality("abc"), None);
    }
}
