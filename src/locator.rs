//! Multi-strategy element resolution for string descriptors.
//!
//! A descriptor can be an id, a name attribute, visible link text, visible
//! element text, or a raw CSS selector. Strategies are tried in a fixed
//! priority order and the first one that resolves wins; a strategy that
//! errors counts as no match and the next one is tried.

use fantoccini::{Locator, elements::Element};
use log::debug;

use crate::client::BrowserClient;

/// Resolve a descriptor against the current page.
///
/// Priority: id, name attribute, exact link text, partial link text, exact
/// element text, partial element text, raw CSS selector. Returns `None` when
/// no strategy matches.
pub async fn find_fuzzy(client: &mut BrowserClient, descriptor: &str) -> Option<Element> {
    let d = descriptor.trim();
    if d.is_empty() {
        return None;
    }

    if let Ok(el) = client.client.find(Locator::Id(d)).await {
        return Some(el);
    }

    let by_name = format!("[name={}]", css_string(d));
    if let Ok(el) = client.client.find(Locator::Css(&by_name)).await {
        return Some(el);
    }

    if let Ok(el) = client.client.find(Locator::LinkText(d)).await {
        return Some(el);
    }

    let partial_link = format!("//a[contains(normalize-space(.), {})]", xpath_string(d));
    if let Ok(el) = client.client.find(Locator::XPath(&partial_link)).await {
        return Some(el);
    }

    let exact_text = format!("//*[text()={}]", xpath_string(d));
    if let Ok(el) = client.client.find(Locator::XPath(&exact_text)).await {
        return Some(el);
    }

    let partial_text = format!("//*[contains(text(), {})]", xpath_string(d));
    if let Ok(el) = client.client.find(Locator::XPath(&partial_text)).await {
        return Some(el);
    }

    // Last resort: interpret the descriptor itself as a selector.
    if let Ok(el) = client.client.find(Locator::Css(d)).await {
        return Some(el);
    }

    debug!("no locator strategy matched descriptor '{d}'");
    None
}

/// First generic input element on the page, used as the fallback target when
/// a type step cannot resolve its descriptor.
pub async fn first_input(client: &mut BrowserClient) -> Option<Element> {
    client.client.find(Locator::Css("input")).await.ok()
}

/// Any option element whose visible text contains the given value.
pub async fn option_with_text(client: &mut BrowserClient, text: &str) -> Option<Element> {
    let xpath = format!(
        "//option[contains(normalize-space(.), {})]",
        xpath_string(text)
    );
    client.client.find(Locator::XPath(&xpath)).await.ok()
}

/// First form-like element on the page, if any.
pub async fn first_form(client: &mut BrowserClient) -> Option<fantoccini::elements::Form> {
    client.client.form(Locator::Css("form")).await.ok()
}

/// Quote a descriptor as a CSS string literal.
fn css_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Quote a descriptor as an XPath string literal. XPath 1.0 has no escape
/// syntax, so a value containing both quote kinds becomes a concat() call.
fn xpath_string(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
