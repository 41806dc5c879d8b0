//! User-input synthesis.
//!
//! Virtual-DOM frameworks only recognize state changes that arrive through
//! their own synthetic event system or through the element's prototype-level
//! value setter, because the framework overrides the per-instance accessor on
//! controlled inputs. Setting `.value` and firing a bare `input` event is not
//! enough. The dispatch order used here is load-bearing: native setter first,
//! then an `insertText` InputEvent carrying the text, then `change`, then the
//! framework's own `onChange` prop as a final fallback.

use tracing::debug;

use crate::element::Element;
use crate::engine::{KeyModifiers, SyntheticEvent};
use crate::errors::AutomationError;
use crate::wait::wait_for;

/// Settle delay after a burst of synthetic input, giving the framework's
/// scheduler a chance to flush before the next step re-queries the DOM.
pub const SETTLE_MS: u64 = 150;

/// Inter-event delay within a synthesized click sequence.
const CLICK_STEP_MS: u64 = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct TypingOptions {
    /// Clear the field (native setter + input event) before typing.
    pub clear_first: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClickOptions {
    /// Extra delay between mousedown/mouseup/click, in milliseconds.
    pub delay_ms: Option<u64>,
    pub double_click: bool,
}

/// Assign a value to a (possibly framework-controlled) input and notify the
/// page. This is the single place that encodes the setter-bypass mechanism;
/// if the host framework's interception changes, this is the one-place fix.
pub async fn set_controlled_value(element: &Element, value: &str) -> Result<(), AutomationError> {
    element.set_native_value(value).await?;
    element
        .dispatch(&SyntheticEvent::Input {
            data: if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            },
        })
        .await
}

/// Type `text` into an input: focus, optional clear, native-setter assign,
/// `insertText` input event, `change` event, framework `onChange` fallback,
/// settle delay.
pub async fn simulate_typing(
    element: &Element,
    text: &str,
    options: TypingOptions,
) -> Result<(), AutomationError> {
    element.focus().await?;
    element.dispatch(&SyntheticEvent::Focus).await?;

    if options.clear_first {
        set_controlled_value(element, "").await?;
    }

    set_controlled_value(element, text).await?;
    element.dispatch(&SyntheticEvent::Change).await?;

    // Belt-and-suspenders: some controlled inputs only commit through the
    // framework's own handler.
    let handled = element.invoke_framework_change(text).await?;
    if handled {
        debug!("framework onChange handler invoked directly");
    }

    wait_for(SETTLE_MS).await;
    Ok(())
}

/// Click an element at its bounding-box center with a realistic
/// mousedown → mouseup → click sequence.
pub async fn simulate_click(
    element: &Element,
    options: ClickOptions,
) -> Result<(), AutomationError> {
    element.scroll_into_view().await?;
    if element.focus().await.is_ok() {
        element.dispatch(&SyntheticEvent::Focus).await?;
    }

    let (x, y, w, h) = element.bounds().await?;
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    let step = options.delay_ms.unwrap_or(CLICK_STEP_MS);

    element
        .dispatch(&SyntheticEvent::MouseDown { x: cx, y: cy })
        .await?;
    wait_for(step).await;
    element
        .dispatch(&SyntheticEvent::MouseUp { x: cx, y: cy })
        .await?;
    wait_for(step).await;
    element
        .dispatch(&SyntheticEvent::Click { x: cx, y: cy })
        .await?;

    if options.double_click {
        wait_for(step).await;
        element
            .dispatch(&SyntheticEvent::DblClick { x: cx, y: cy })
            .await?;
    }

    wait_for(SETTLE_MS).await;
    Ok(())
}

/// Dispatch keydown + keyup for a single key with modifier flags.
pub async fn simulate_key_press(
    element: &Element,
    key: &str,
    modifiers: KeyModifiers,
) -> Result<(), AutomationError> {
    element
        .dispatch(&SyntheticEvent::KeyDown {
            key: key.to_string(),
            modifiers,
        })
        .await?;
    element
        .dispatch(&SyntheticEvent::KeyUp {
            key: key.to_string(),
            modifiers,
        })
        .await
}
