//! [`Convertible`] implementations for standard and common library types.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::converter::{FromFn, NULL};
use super::registry::Converters;
use super::strategy::{Convertible, FromText, ParseStrategy, ToText};
use crate::format::{join_list_reserving, split_list_raw, unescape_element};

crate::convertible_from_str!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, uuid::Uuid,
);

impl Convertible for String {
    fn native_text(&self) -> String {
        self.clone()
    }

    fn null_value() -> Option<Self> {
        Some(String::new())
    }

    fn factory() -> Option<FromFn<Self>> {
        Some(Arc::new(|_: &Converters, text: &str| Ok(text.to_string())))
    }
}

impl Convertible for PathBuf {
    fn native_text(&self) -> String {
        self.to_string_lossy().into_owned()
    }

    fn factory() -> Option<FromFn<Self>> {
        Some(Arc::new(|_: &Converters, text: &str| Ok(PathBuf::from(text))))
    }
}

// ── Duration ──────────────────────────────────────────────────────────────────

/// Written as a whole number with the coarsest exact unit: `90s`, `250ms`,
/// `15ns`.  Parsing also accepts `m` (minutes) and `h` (hours).
impl Convertible for Duration {
    fn parse_strategy() -> Option<ParseStrategy<Self>> {
        Some(ParseStrategy {
            from: FromText::method(parse_duration),
            to: ToText::method(|d: &Duration| Ok::<_, String>(format_duration(*d))),
        })
    }
}

fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos % 1_000_000_000 == 0 {
        format!("{}s", d.as_secs())
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{nanos}ns")
    }
}

fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("missing unit in {text:?} (ns, ms, s, m or h)"))?;
    let (number, unit) = text.split_at(split);
    let n: u64 = number.parse().map_err(|_| format!("missing amount in {text:?}"))?;
    let seconds = |factor: u64| {
        n.checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("{text:?} is too large"))
    };
    match unit {
        "ns" => Ok(Duration::from_nanos(n)),
        "ms" => Ok(Duration::from_millis(n)),
        "s" => Ok(Duration::from_secs(n)),
        "m" => seconds(60),
        "h" => seconds(3600),
        other => Err(format!("unknown unit {other:?} (ns, ms, s, m or h)")),
    }
}

// ── Composites ────────────────────────────────────────────────────────────────

/// `None` is written as the null sentinel.  The sentinel is reserved, so a
/// `Some` whose text is `null` (for example `Some("null".to_string())`) also
/// reads back as `None`.
impl<T: Convertible> Convertible for Option<T> {
    fn native_text(&self) -> String {
        match self {
            Some(value) => value.native_text(),
            None => NULL.to_string(),
        }
    }

    fn null_value() -> Option<Self> {
        Some(None)
    }

    fn parse_strategy() -> Option<ParseStrategy<Self>> {
        Some(ParseStrategy {
            from: FromText::Method(Arc::new(|converters: &Converters, text: &str| {
                converters.from_string::<T>(text).map(Some)
            })),
            to: ToText::Method(Arc::new(|converters: &Converters, value: &Option<T>| {
                converters.to_string_opt(value.as_ref())
            })),
        })
    }
}

/// Elements are converted one by one and joined with
/// [`join_list_reserving`](crate::format::join_list_reserving).  The null
/// sentinel is the empty list.  An element whose text is the sentinel is
/// written as `\null` wherever it sits, so only a bare `null` element
/// parses to the element type's null value.
impl<T: Convertible> Convertible for Vec<T> {
    fn native_text(&self) -> String {
        let elements: Vec<String> = self.iter().map(Convertible::native_text).collect();
        join_list_reserving(&elements, NULL)
    }

    fn null_value() -> Option<Self> {
        Some(Vec::new())
    }

    fn parse_strategy() -> Option<ParseStrategy<Self>> {
        Some(ParseStrategy {
            from: FromText::Method(Arc::new(|converters: &Converters, text: &str| {
                let element = converters.get::<T>();
                split_list_raw(text)
                    .iter()
                    .map(|raw| {
                        if raw == NULL {
                            converters.from_string::<T>(raw)
                        } else {
                            element.from_text(converters, &unescape_element(raw))
                        }
                    })
                    .collect()
            })),
            to: ToText::Method(Arc::new(|converters: &Converters, values: &Vec<T>| {
                let elements = values
                    .iter()
                    .map(|value| converters.to_string(value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_list_reserving(&elements, NULL))
            })),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConvertError;

    #[test]
    fn test_primitives_round_trip() {
        let converters = Converters::new();

        assert_eq!(converters.to_string(&true).unwrap(), "true");
        assert!(converters.from_string::<bool>("false").is_ok());
        assert_eq!(converters.from_string::<i64>("-42").unwrap(), -42);
        assert_eq!(converters.to_string(&0.1f64).unwrap(), "0.1");
        assert_eq!(converters.from_string::<f32>("2.5").unwrap(), 2.5);
        assert_eq!(converters.from_string::<char>("x").unwrap(), 'x');
    }

    #[test]
    fn test_primitive_parse_failure_is_parse_error() {
        let converters = Converters::new();

        let err = converters.from_string::<u8>("300").unwrap_err();

        assert!(matches!(err, ConvertError::Parse { text, .. } if text == "300"));
    }

    #[test]
    fn test_string_null_value_is_empty() {
        let converters = Converters::new();
        assert_eq!(converters.from_string::<String>(NULL).unwrap(), "");
        assert_eq!(converters.from_string::<String>(" kept ").unwrap(), " kept ");
    }

    #[test]
    fn test_network_types() {
        let converters = Converters::new();

        let addr: SocketAddr = converters.from_string("127.0.0.1:8080").unwrap();

        assert_eq!(addr.port(), 8080);
        assert_eq!(converters.to_string(&addr).unwrap(), "127.0.0.1:8080");
        assert!(converters.from_string::<IpAddr>("::1").unwrap().is_loopback());
    }

    #[test]
    fn test_uuid_and_path() {
        let converters = Converters::new();
        let id = uuid::Uuid::new_v4();

        assert_eq!(converters.from_string::<uuid::Uuid>(&id.to_string()).unwrap(), id);
        assert_eq!(
            converters.from_string::<PathBuf>("/tmp/a b").unwrap(),
            PathBuf::from("/tmp/a b")
        );
    }

    #[test]
    fn test_duration_formats_with_coarsest_exact_unit() {
        let converters = Converters::new();

        assert_eq!(converters.to_string(&Duration::from_secs(90)).unwrap(), "90s");
        assert_eq!(converters.to_string(&Duration::from_millis(250)).unwrap(), "250ms");
        assert_eq!(converters.to_string(&Duration::from_nanos(15)).unwrap(), "15ns");
    }

    #[test]
    fn test_duration_parses_all_units() {
        let converters = Converters::new();

        assert_eq!(converters.from_string::<Duration>("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(converters.from_string::<Duration>("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(converters.from_string::<Duration>(" 5ms ").unwrap(), Duration::from_millis(5));
    }

    #[test]
    fn test_duration_rejects_missing_or_unknown_unit() {
        let converters = Converters::new();

        assert!(matches!(
            converters.from_string::<Duration>("10"),
            Err(ConvertError::Parse { .. })
        ));
        assert!(matches!(
            converters.from_string::<Duration>("10d"),
            Err(ConvertError::Parse { message, .. }) if message.contains("unknown unit")
        ));
    }

    #[test]
    fn test_option_uses_sentinel_for_none() {
        let converters = Converters::new();

        assert_eq!(converters.to_string(&None::<u16>).unwrap(), NULL);
        assert_eq!(converters.to_string(&Some(5u16)).unwrap(), "5");
        assert_eq!(converters.from_string::<Option<u16>>("5").unwrap(), Some(5));
        assert_eq!(converters.from_string::<Option<u16>>(NULL).unwrap(), None);
    }

    #[test]
    fn test_vec_round_trip_with_separators_in_elements() {
        // Arrange
        let converters = Converters::new();
        let values = vec!["a;b".to_string(), String::new(), "c\\".to_string()];

        // Act
        let text = converters.to_string(&values).unwrap();
        let back = converters.from_string::<Vec<String>>(&text).unwrap();

        // Assert
        assert_eq!(back, values);
    }

    #[test]
    fn test_vec_of_numbers_reports_bad_element() {
        let converters = Converters::new();

        assert_eq!(converters.from_string::<Vec<u8>>("1;2;3").unwrap(), vec![1, 2, 3]);
        assert!(converters.from_string::<Vec<u8>>("1;x").is_err());
    }

    #[test]
    fn test_vec_holding_only_sentinel_is_not_empty_list() {
        let converters = Converters::new();
        let values = vec![NULL.to_string()];

        let text = converters.to_string(&values).unwrap();

        assert_ne!(text, NULL);
        assert_eq!(converters.from_string::<Vec<String>>(&text).unwrap(), values);
        assert!(converters.from_string::<Vec<String>>(NULL).unwrap().is_empty());
    }

    #[test]
    fn test_vec_with_sentinel_element_among_others() {
        // Arrange
        let converters = Converters::new();
        let values = vec![NULL.to_string(), "a".to_string(), NULL.to_string()];

        // Act
        let text = converters.to_string(&values).unwrap();

        // Assert
        assert_eq!(text, "\\null;a;\\null");
        assert_eq!(converters.from_string::<Vec<String>>(&text).unwrap(), values);
    }

    #[test]
    fn test_bare_sentinel_element_is_element_null_value() {
        let converters = Converters::new();

        assert_eq!(
            converters.from_string::<Vec<String>>("null;a").unwrap(),
            vec![String::new(), "a".to_string()]
        );
        assert_eq!(
            converters.from_string::<Vec<Option<u8>>>("1;null").unwrap(),
            vec![Some(1), None]
        );
    }

    #[test]
    fn test_nested_vec_with_sentinel() {
        let converters = Converters::new();
        let values = vec![vec![NULL.to_string()], vec![], vec!["x".to_string(), NULL.to_string()]];

        let text = converters.to_string(&values).unwrap();

        assert_eq!(converters.from_string::<Vec<Vec<String>>>(&text).unwrap(), values);
    }

    #[test]
    fn test_option_of_sentinel_text_reads_back_as_none() {
        let converters = Converters::new();

        let text = converters.to_string(&Some(NULL.to_string())).unwrap();

        assert_eq!(text, NULL);
        assert_eq!(converters.from_string::<Option<String>>(&text).unwrap(), None);
    }

    #[test]
    fn test_nested_vec() {
        let converters = Converters::new();
        let values = vec![vec![1u32, 2], vec![], vec![3]];

        let text = converters.to_string(&values).unwrap();

        assert_eq!(converters.from_string::<Vec<Vec<u32>>>(&text).unwrap(), values);
    }
}
