//! Label counting and registrable-domain extraction

pub struct DomainLabelUtility;

impl DomainLabelUtility {
    fn labels(domain: &str) -> impl DoubleEndedIterator<Item = &str> {
        domain.split('.').filter(|label| !label.is_empty())
    }

    /// Number of non-empty labels: `com` is 1, `www.example.com` is 3
    pub fn domain_level(domain: &str) -> usize {
        Self::labels(domain).count()
    }

    /// Last two labels, however deep the name is
    pub fn second_level_domain(domain: &str) -> String {
        let mut tail: Vec<&str> = Self::labels(domain).rev().take(2).collect();
        tail.reverse();
        tail.join(".")
    }
}
