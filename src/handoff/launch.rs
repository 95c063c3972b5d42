use std::collections::BTreeMap;
use url::Url;

use crate::error::HandoffError;

/// A request to open a second browsing context on `route`.
///
/// Query parameters carry routing and branch selection only; answer data
/// travels through the handoff store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    route: String,
    params: Vec<(String, String)>,
}

impl LaunchRequest {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolves the route against `base_url` and appends the parameters.
    pub fn to_url(&self, base_url: &str) -> Result<Url, HandoffError> {
        let base = Url::parse(base_url)
            .map_err(|error| HandoffError::LaunchUrl(format!("{base_url}: {error}")))?;
        if base.cannot_be_a_base() {
            return Err(HandoffError::LaunchUrl(format!(
                "{base_url}: cannot be used as a base"
            )));
        }
        let mut url = base
            .join(self.route.trim_start_matches('/'))
            .map_err(|error| HandoffError::LaunchUrl(format!("{}: {error}", self.route)))?;

        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

/// Query parameters a receiving window was opened with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
    params: BTreeMap<String, String>,
}

impl LaunchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_url(raw: &str) -> Result<Self, HandoffError> {
        let url = Url::parse(raw).map_err(|error| HandoffError::LaunchUrl(format!("{raw}: {error}")))?;
        Ok(Self::from_pairs(url.query_pairs()))
    }

    /// Parses a bare query string (`a=1&b=2`, leading `?` optional).
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(
            query.trim_start_matches('?').as_bytes(),
        ))
    }

    /// The first occurrence of a repeated parameter wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = BTreeMap::new();
        for (name, value) in pairs {
            params.entry(name.into()).or_insert_with(|| value.into());
        }
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_url_joins_route_and_encodes_params() {
        let url = LaunchRequest::new("/consent/change")
            .param("project", "P 12")
            .param("variant", "with-supervisor")
            .to_url("http://localhost:3000/app/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/app/consent/change?project=P+12&variant=with-supervisor"
        );
    }

    #[test]
    fn launch_url_without_params_has_no_query() {
        let url = LaunchRequest::new("survey")
            .to_url("https://backoffice.example")
            .unwrap();
        assert_eq!(url.as_str(), "https://backoffice.example/survey");
        assert!(url.query().is_none());
    }

    #[test]
    fn launch_url_rejects_bad_base() {
        assert!(LaunchRequest::new("x").to_url("not a url").is_err());
        assert!(LaunchRequest::new("x").to_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn params_parse_from_url() {
        let params =
            LaunchParams::from_url("http://localhost:3000/survey?variant=with-supervisor&project=P%2D7")
                .unwrap();
        assert_eq!(params.get("variant"), Some("with-supervisor"));
        assert_eq!(params.get("project"), Some("P-7"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn first_repeated_param_wins() {
        let params = LaunchParams::from_query("?variant=standard&variant=with-supervisor");
        assert_eq!(params.get("variant"), Some("standard"));
    }
}
