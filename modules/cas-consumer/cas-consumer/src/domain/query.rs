//! Query string assembly shared by validation and redirect URLs.

use url::Url;

/// Append `pairs` to the query of `url`.
///
/// With `encode` the pairs are form-urlencoded. Otherwise they are joined as
/// raw `key=value` text; `Url` still escapes characters that cannot appear in
/// a query at all (spaces, quotes, angle brackets).
pub fn append_query<'a, I>(url: &mut Url, pairs: I, encode: bool)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if encode {
        url.query_pairs_mut().extend_pairs(pairs);
        return;
    }

    let raw = pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    if raw.is_empty() {
        return;
    }

    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{raw}"),
        _ => raw,
    };
    url.set_query(Some(&query));
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn encoded_pairs_escape_reserved_characters() {
        let mut url = Url::parse("https://cas.example.com/cas/validate/").unwrap();
        append_query(
            &mut url,
            [("ticket", "bar"), ("service", "http://example.com/service/")],
            true,
        );

        assert_eq!(
            url.query(),
            Some("ticket=bar&service=http%3A%2F%2Fexample.com%2Fservice%2F")
        );
    }

    #[test]
    fn raw_pairs_keep_reserved_characters() {
        let mut url = Url::parse("https://cas.example.com/cas/validate/").unwrap();
        append_query(
            &mut url,
            [("ticket", "bar"), ("service", "http://example.com/service/")],
            false,
        );

        assert_eq!(
            url.query(),
            Some("ticket=bar&service=http://example.com/service/")
        );
    }

    #[test]
    fn raw_pairs_extend_existing_query() {
        let mut url = Url::parse("https://cas.example.com/validate?tenant=a").unwrap();
        append_query(&mut url, [("ticket", "t")], false);

        assert_eq!(url.query(), Some("tenant=a&ticket=t"));
    }
}
