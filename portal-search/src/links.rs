use url::Url;

/// Query parameter carrying the referral tag on outbound links.
pub const REFERRAL_PARAM: &str = "from";

/// Append `from=<tag>` to `link`. Links that do not parse are returned as-is.
pub fn with_referral(link: &str, tag: &str) -> String {
    match Url::parse(link) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(REFERRAL_PARAM, tag);
            url.to_string()
        }
        Err(err) => {
            tracing::debug!(link, error=%err, "links.referral.unparsable");
            link.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_to_existing_query() {
        assert_eq!(
            with_referral("https://example.com/a?b=1", "portal"),
            "https://example.com/a?b=1&from=portal"
        );
        assert_eq!(
            with_referral("https://example.com", "portal"),
            "https://example.com/?from=portal"
        );
    }

    #[test]
    fn leaves_garbage_alone() {
        assert_eq!(with_referral("not a url", "portal"), "not a url");
    }
}
