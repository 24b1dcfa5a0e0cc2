use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const SEARCH_LIMIT: usize = 5;
const NSE_SUFFIX: &str = ".NS";

/// Well-known names that skip the remote search. Keys are lowercase and trimmed.
static KNOWN_TICKERS: &[(&str, &str)] = &[
    ("reliance", "RELIANCE.NS"),
    ("tcs", "TCS.NS"),
    ("infosys", "INFY.NS"),
    ("hdfc bank", "HDFCBANK.NS"),
    ("icici bank", "ICICIBANK.NS"),
    ("wipro", "WIPRO.NS"),
    ("bharti airtel", "BHARTIARTL.NS"),
    ("itc", "ITC.NS"),
    ("sun pharma", "SUNPHARMA.NS"),
    ("asian paints", "ASIANPAINT.NS"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange_short_name: Option<String>,
}

#[async_trait::async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

pub fn known_ticker(company_name: &str) -> Option<&'static str> {
    let normalized = company_name.trim().to_lowercase();
    KNOWN_TICKERS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, ticker)| *ticker)
}

/// Best-effort name to ticker. Never fails: a miss falls back to the trimmed input.
pub async fn resolve_symbol(
    search: &dyn SymbolSearch,
    company_name: &str,
    exchange: Option<&str>,
) -> String {
    if let Some(ticker) = known_ticker(company_name) {
        return ticker.to_string();
    }

    let query = company_name.trim();
    match search.search(query, SEARCH_LIMIT).await {
        Ok(hits) => {
            if let Some(symbol) = pick(&hits, exchange) {
                return symbol.to_string();
            }
            tracing::warn!(%query, "symbol search returned no candidates; using input as ticker");
        }
        Err(err) => {
            tracing::warn!(%query, error = %err, "symbol search failed; using input as ticker");
        }
    }
    query.to_string()
}

fn pick<'a>(hits: &'a [SearchHit], exchange: Option<&str>) -> Option<&'a str> {
    let prefers_nse = exchange.is_some_and(|e| e.trim().eq_ignore_ascii_case("NSE"));
    if prefers_nse {
        if let Some(hit) = hits.iter().find(|h| h.symbol.ends_with(NSE_SUFFIX)) {
            return Some(&hit.symbol);
        }
    }
    hits.first().map(|h| h.symbol.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeSearch {
        hits: Result<Vec<SearchHit>, String>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    impl FakeSearch {
        fn new(hits: Result<Vec<SearchHit>, String>) -> Self {
            Self {
                hits,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SymbolSearch for FakeSearch {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
            self.queries.lock().unwrap().push((query.to_string(), limit));
            self.hits.clone().map_err(anyhow::Error::msg)
        }
    }

    fn hit(symbol: &str) -> SearchHit {
        SearchHit {
            symbol: symbol.to_string(),
            name: None,
            exchange_short_name: None,
        }
    }

    #[tokio::test]
    async fn known_names_skip_search() {
        let search = FakeSearch::new(Ok(vec![hit("WRONG")]));
        assert_eq!(resolve_symbol(&search, "  Infosys ", None).await, "INFY.NS");
        assert!(search.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn nse_hint_prefers_nse_suffix() {
        let search = FakeSearch::new(Ok(vec![hit("TTM"), hit("TATAMOTORS.NS")]));
        assert_eq!(
            resolve_symbol(&search, "Tata Motors", Some("nse")).await,
            "TATAMOTORS.NS"
        );
        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            &[("Tata Motors".to_string(), SEARCH_LIMIT)]
        );
    }

    #[tokio::test]
    async fn without_hint_first_candidate_wins() {
        let search = FakeSearch::new(Ok(vec![hit("TTM"), hit("TATAMOTORS.NS")]));
        assert_eq!(resolve_symbol(&search, "Tata Motors", None).await, "TTM");

        let search = FakeSearch::new(Ok(vec![hit("AAPL")]));
        assert_eq!(resolve_symbol(&search, "Apple", Some("NSE")).await, "AAPL");
    }

    #[tokio::test]
    async fn failures_fall_back_to_input() {
        let search = FakeSearch::new(Err("timeout".to_string()));
        assert_eq!(resolve_symbol(&search, " ACME ", None).await, "ACME");

        let search = FakeSearch::new(Ok(Vec::new()));
        assert_eq!(resolve_symbol(&search, "ACME", None).await, "ACME");
    }
}
