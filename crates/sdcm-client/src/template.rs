//! Positional URL templates for the management API
//!
//! Templates use `{N}` slots. Slot `{0}` is the API version, `{1}` the tenant
//! segment, and `{2}` onward are the caller's path parameters in order.

use url::Url;

use crate::error::{Result, SdcmClientError};

/// A path template with positional `{N}` slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlTemplate(&'static str);

/// `GET`/`POST /hardware/products`
pub const PRODUCTS: UrlTemplate = UrlTemplate("/v{0}/{1}/hardware/products");
/// `GET` a continuation page returned by a previous listing
pub const PRODUCTS_CONTINUATION: UrlTemplate = UrlTemplate("/v{0}/{1}/{2}");
/// `GET /hardware/products/{id}`
pub const PRODUCT: UrlTemplate = UrlTemplate("/v{0}/{1}/hardware/products/{2}");
/// `POST /hardware/products/{pid}/submissions`
pub const SUBMISSIONS: UrlTemplate = UrlTemplate("/v{0}/{1}/hardware/products/{2}/submissions");
/// `GET /hardware/products/{pid}/submissions/{sid}`, also used for status
pub const SUBMISSION: UrlTemplate =
    UrlTemplate("/v{0}/{1}/hardware/products/{2}/submissions/{3}");
/// `POST /hardware/products/{pid}/submissions/{sid}/commit`
pub const COMMIT_SUBMISSION: UrlTemplate =
    UrlTemplate("/v{0}/{1}/hardware/products/{2}/submissions/{3}/commit");

impl UrlTemplate {
    /// Define a custom template
    pub const fn new(pattern: &'static str) -> Self {
        Self(pattern)
    }

    /// The raw pattern
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Substitute `args` into the template's slots.
    ///
    /// Text that is not a `{digits}` slot is copied through unchanged. A slot
    /// index with no corresponding argument is an error.
    pub fn render(&self, args: &[&str]) -> Result<String> {
        let pattern = self.0;
        let capacity = pattern.len() + args.iter().map(|a| a.len()).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let slot = after
                .find('}')
                .map(|close| (&after[..close], close))
                .filter(|(digits, _)| {
                    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
                });

            match slot {
                Some((digits, close)) => {
                    let index: usize = digits.parse().map_err(|_| {
                        SdcmClientError::InvalidTemplate(format!(
                            "slot {{{}}} in {}",
                            digits, pattern
                        ))
                    })?;
                    let value = args.get(index).ok_or_else(|| {
                        SdcmClientError::InvalidTemplate(format!(
                            "no value for slot {{{}}} in {} ({} given)",
                            index,
                            pattern,
                            args.len()
                        ))
                    })?;
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Parse a base URL so that later joins extend its path instead of replacing it
///
/// `http://gw/sdcm` becomes `http://gw/sdcm/`; a host-only base is unchanged.
pub(crate) fn parse_base_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append a rendered path (leading `/` optional) below `base`
pub(crate) fn join_base(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/')).map_err(Into::into)
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_path() {
        let path = COMMIT_SUBMISSION.render(&["1.0", "my", "P1", "S1"]).unwrap();
        assert_eq!(path, "/v1.0/my/hardware/products/P1/submissions/S1/commit");
    }

    #[test]
    fn test_fixed_templates() {
        let args = ["1.0", "my", "13635057", "1152921505693471234"];
        assert_eq!(PRODUCTS.render(&args[..2]).unwrap(), "/v1.0/my/hardware/products");
        assert_eq!(
            PRODUCT.render(&args[..3]).unwrap(),
            "/v1.0/my/hardware/products/13635057"
        );
        assert_eq!(
            SUBMISSIONS.render(&args[..3]).unwrap(),
            "/v1.0/my/hardware/products/13635057/submissions"
        );
        assert_eq!(
            SUBMISSION.render(&args).unwrap(),
            "/v1.0/my/hardware/products/13635057/submissions/1152921505693471234"
        );
    }

    #[test]
    fn test_continuation_template() {
        let path = PRODUCTS_CONTINUATION
            .render(&["1.0", "my", "hardware/products?continuationToken=abc"])
            .unwrap();
        assert_eq!(path, "/v1.0/my/hardware/products?continuationToken=abc");
    }

    #[test]
    fn test_extra_args_ignored() {
        let path = PRODUCTS.render(&["1.0", "my", "unused"]).unwrap();
        assert_eq!(path, "/v1.0/my/hardware/products");
    }

    #[test]
    fn test_missing_arg_is_error() {
        let result = SUBMISSION.render(&["1.0", "my", "P1"]);
        assert!(matches!(result, Err(SdcmClientError::InvalidTemplate(_))));
    }

    #[test]
    fn test_non_slot_braces_pass_through() {
        let template = UrlTemplate::new("/v{0}/{name}/{");
        assert_eq!(template.render(&["2"]).unwrap(), "/v2/{name}/{");
    }

    #[test]
    fn test_join_keeps_base_path_prefix() {
        let base = parse_base_url("http://gateway.local/sdcm").unwrap();
        let path = PRODUCTS.render(&["1.0", "my"]).unwrap();
        assert_eq!(
            join_base(&base, &path).unwrap().as_str(),
            "http://gateway.local/sdcm/v1.0/my/hardware/products"
        );

        let base = parse_base_url("http://gateway.local/sdcm/").unwrap();
        assert_eq!(
            join_base(&base, "v1.0/my/hardware/products/P1").unwrap().as_str(),
            "http://gateway.local/sdcm/v1.0/my/hardware/products/P1"
        );
    }

    #[test]
    fn test_join_host_only_base() {
        let base = parse_base_url("https://manage.devcenter.microsoft.com").unwrap();
        assert_eq!(base.as_str(), "https://manage.devcenter.microsoft.com/");
        let url = join_base(&base, "/v1.0/my/hardware/products?continuationToken=abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://manage.devcenter.microsoft.com/v1.0/my/hardware/products?continuationToken=abc"
        );
    }

    #[test]
    fn test_slots_out_of_order() {
        let template = UrlTemplate::new("/{1}/{0}/{1}");
        assert_eq!(template.render(&["a", "b"]).unwrap(), "/b/a/b");
    }
}
