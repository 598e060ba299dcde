use crate::error::Result;

/// Narrow view of the page-automation capability the extraction pipeline
/// runs against: navigate, wait for a marker element, and read text or an
/// attribute from every element matching a selector.
///
/// One session handles one navigation at a time; queries apply to the most
/// recently loaded page.
pub trait DomDriver {
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Blocks until the marker element is visible, or fails if the page never
    /// renders it.
    fn wait_visible(&mut self, selector: &str) -> Result<()>;

    /// Text content of every matching element, skipping elements whose text
    /// is empty.
    fn texts(&self, selector: &str) -> Result<Vec<String>>;

    /// Value of `attr` on every matching element, skipping elements that do
    /// not carry the attribute.
    fn attr_values(&self, selector: &str, attr: &str) -> Result<Vec<String>>;
}
