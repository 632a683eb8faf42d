/// Domain extraction and counting logic for Tab Vault
use std::collections::HashMap;
use url::Url;

/// Domain recorded for tabs whose URL cannot be parsed
pub const UNKNOWN_DOMAIN: &str = "Unknown";

/// Extract the domain from a URL
///
/// The domain is the URL's host with a leading `www.` removed. URLs that
/// fail to parse map to [`UNKNOWN_DOMAIN`]; URLs that parse but carry no
/// host (`about:blank`, `file:///...`) map to the empty string.
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://ai.microsoft.com → ai.microsoft.com
/// - http://localhost:3000 → localhost
/// - not a url → Unknown
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("");
            host.strip_prefix("www.").unwrap_or(host).to_string()
        }
        Err(_) => UNKNOWN_DOMAIN.to_string(),
    }
}

/// Count domain occurrences, keeping the order in which domains first appear
pub fn count_domains<'a, I>(domains: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for domain in domains {
        match positions.get(domain) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(domain, counts.len());
                counts.push((domain.to_string(), 1));
            }
        }
    }

    counts
}

/// The first domain to reach the highest count, in first-seen order
pub fn most_frequent(counts: &[(String, usize)]) -> Option<&str> {
    let mut best: Option<&(String, usize)> = None;
    for entry in counts {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(domain, _)| domain.as_str())
}
