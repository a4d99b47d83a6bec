//! Pure page-state queries: interactive elements, overlay signature,
//! element state.
//!
//! Each query is a single `Runtime.evaluate` returning JSON, deserialized
//! into the core model. None of them mutates the page.

use deadscan_core::{DiscoveredElement, OverlaySignature, StateAttrs};
use serde_json::Value;

use crate::cdp::{CdpError, PageSession};

/// Discovery query: every visible interactive element intersecting the
/// viewport, in document order, reduced to the `DiscoveredElement` shape.
///
/// Selector derivation prefers stable test ids, then scan-group tags, then
/// element ids, then a short nth-of-type path.
const INTERACTIVE_ELEMENTS_JS: &str = r#"(() => {
  const INTERACTIVE =
    'a[href], button, input[type=button], input[type=submit], input[type=reset], ' +
    '[role=button], [role=link], [role=tab], [role=switch], [role=checkbox], [role=menuitem]';
  const vw = window.innerWidth || document.documentElement.clientWidth;
  const vh = window.innerHeight || document.documentElement.clientHeight;

  const cssPath = (el) => {
    if (el.dataset && el.dataset.testid) {
      return `[data-testid="${el.dataset.testid}"]`;
    }
    if (el.dataset && el.dataset.scanGroup) {
      return `[data-scan-group="${el.dataset.scanGroup}"]`;
    }
    if (el.id) {
      return `#${CSS.escape(el.id)}`;
    }
    const parts = [];
    let node = el;
    while (node && node.nodeType === 1 && parts.length < 6) {
      let part = node.localName;
      const parent = node.parentElement;
      if (parent) {
        const siblings = Array.from(parent.children).filter(
          (c) => c.localName === node.localName
        );
        if (siblings.length > 1) {
          part += `:nth-of-type(${siblings.indexOf(node) + 1})`;
        }
      }
      parts.unshift(part);
      if (node.id) {
        parts[0] = `#${CSS.escape(node.id)}`;
        break;
      }
      node = parent;
    }
    return parts.join(' > ');
  };

  const out = [];
  for (const el of document.querySelectorAll(INTERACTIVE)) {
    const rect = el.getBoundingClientRect();
    if (rect.width <= 0 || rect.height <= 0) continue;
    if (rect.bottom < 0 || rect.right < 0 || rect.top > vh || rect.left > vw) continue;
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') continue;

    const nativeDisabled = el.disabled === true;
    const ariaDisabled = el.getAttribute('aria-disabled') === 'true';
    const label = (el.getAttribute('aria-label') || el.innerText || el.value || '')
      .trim()
      .replace(/\s+/g, ' ')
      .slice(0, 80);

    out.push({
      stableId: (el.dataset && el.dataset.testid) || null,
      scanGroup: (el.dataset && el.dataset.scanGroup) || null,
      tagName: el.localName,
      role: el.getAttribute('role'),
      href: el.getAttribute('href'),
      label,
      disabled: nativeDisabled || ariaDisabled,
      selector: cssPath(el),
      state: {
        expanded: el.getAttribute('aria-expanded'),
        pressed: el.getAttribute('aria-pressed'),
        checked: el.getAttribute('aria-checked'),
        open: el.getAttribute('open'),
        selected: el.getAttribute('aria-selected'),
        class: el.getAttribute('class'),
      },
      inputType: el.getAttribute('type'),
      disabledReason: nativeDisabled
        ? 'disabled attribute'
        : ariaDisabled
          ? 'aria-disabled="true"'
          : null,
    });
  }
  return out;
})()"#;

/// Overlay signature query: count of visible nodes matching any of the
/// structural modal heuristics.
const OVERLAY_SIGNATURE_JS: &str = r#"(() => {
  const OVERLAY =
    '[role=dialog], [role=alertdialog], dialog[open], [data-state=open], ' +
    '[aria-modal=true], [data-popper-placement], [data-floating-ui-placement]';
  let open = 0;
  for (const el of document.querySelectorAll(OVERLAY)) {
    const rect = el.getBoundingClientRect();
    if (rect.width > 0 && rect.height > 0) open += 1;
  }
  return { openDialogs: open };
})()"#;

/// Visible interactive elements in the viewport.
pub async fn visible_interactive_elements(
    session: &PageSession,
) -> Result<Vec<DiscoveredElement>, CdpError> {
    let value = session.evaluate(INTERACTIVE_ELEMENTS_JS).await?;
    if value == Value::Null {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(CdpError::Serialization)
}

/// Current overlay/dialog signature.
pub async fn overlay_signature(session: &PageSession) -> Result<OverlaySignature, CdpError> {
    let value = session.evaluate(OVERLAY_SIGNATURE_JS).await?;
    serde_json::from_value(value).map_err(CdpError::Serialization)
}

/// Re-read the mutable-state attributes of the element at `selector`.
/// `Ok(None)` means the element no longer resolves.
pub async fn element_state(
    session: &PageSession,
    selector: &str,
) -> Result<Option<StateAttrs>, CdpError> {
    let value = session.evaluate(&element_state_js(selector)).await?;
    if value == Value::Null {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(CdpError::Serialization)
}

fn element_state_js(selector: &str) -> String {
    // Value::String renders a correctly quoted/escaped JS string literal.
    let quoted = Value::String(selector.to_string()).to_string();
    format!(
        r#"(() => {{
  const el = document.querySelector({quoted});
  if (!el) return null;
  return {{
    expanded: el.getAttribute('aria-expanded'),
    pressed: el.getAttribute('aria-pressed'),
    checked: el.getAttribute('aria-checked'),
    open: el.getAttribute('open'),
    selected: el.getAttribute('aria-selected'),
    class: el.getAttribute('class'),
  }};
}})()"#
    )
}

/// Best-effort in-page trial click. Returns the expression; evaluation
/// yields `false` when the selector no longer resolves.
pub(crate) fn trial_click_js(selector: &str) -> String {
    let quoted = Value::String(selector.to_string()).to_string();
    format!(
        r#"(() => {{
  const el = document.querySelector({quoted});
  if (!el) return false;
  try {{ el.click(); }} catch (_e) {{}}
  return true;
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_filters_on_viewport_and_visibility() {
        assert!(INTERACTIVE_ELEMENTS_JS.contains("getBoundingClientRect"));
        assert!(INTERACTIVE_ELEMENTS_JS.contains("rect.width <= 0"));
        assert!(INTERACTIVE_ELEMENTS_JS.contains("visibility"));
    }

    #[test]
    fn discovery_covers_native_and_aria_controls() {
        assert!(INTERACTIVE_ELEMENTS_JS.contains("a[href]"));
        assert!(INTERACTIVE_ELEMENTS_JS.contains("[role=button]"));
        assert!(INTERACTIVE_ELEMENTS_JS.contains("input[type=submit]"));
    }

    #[test]
    fn selector_derivation_prefers_stable_ids() {
        let testid = INTERACTIVE_ELEMENTS_JS.find("data-testid").unwrap();
        let group = INTERACTIVE_ELEMENTS_JS.find("data-scan-group").unwrap();
        let nth = INTERACTIVE_ELEMENTS_JS.find("nth-of-type").unwrap();
        assert!(testid < group && group < nth);
    }

    #[test]
    fn overlay_heuristics_cover_dialogs_and_poppers() {
        assert!(OVERLAY_SIGNATURE_JS.contains("[role=dialog]"));
        assert!(OVERLAY_SIGNATURE_JS.contains("[role=alertdialog]"));
        assert!(OVERLAY_SIGNATURE_JS.contains("dialog[open]"));
        assert!(OVERLAY_SIGNATURE_JS.contains("data-popper-placement"));
    }

    #[test]
    fn element_state_js_quotes_hostile_selectors() {
        let js = element_state_js(r#"button[aria-label="Say \"hi\""]"#);
        assert!(js.contains(r#"document.querySelector("button[aria-label=\"Say \\\"hi\\\"\"]")"#));
    }

    #[test]
    fn discovery_shape_parses_into_the_core_model() {
        let json = r#"[{
            "stableId": null,
            "scanGroup": "start-practice",
            "tagName": "button",
            "role": null,
            "href": null,
            "label": "Start",
            "disabled": false,
            "selector": "[data-scan-group=\"start-practice\"]",
            "state": {"expanded": null, "pressed": null, "checked": null,
                      "open": null, "selected": null, "class": "btn"},
            "inputType": null,
            "disabledReason": null
        }]"#;
        let elements: Vec<DiscoveredElement> = serde_json::from_str(json).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].snapshot.scan_group.as_deref(), Some("start-practice"));
        assert_eq!(elements[0].state.class.as_deref(), Some("btn"));
    }
}
