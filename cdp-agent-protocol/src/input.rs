//! `Input` domain: https://chromedevtools.github.io/devtools-protocol/tot/Input/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseEventType {
    MousePressed,
    MouseReleased,
    MouseMoved,
    MouseWheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMouseEventParams {
    #[serde(rename = "type")]
    pub event_type: MouseEventType,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_y: Option<f64>,
    #[serde(default)]
    pub modifiers: i64,
}

impl DispatchMouseEventParams {
    pub fn click_at(x: f64, y: f64, event_type: MouseEventType) -> Self {
        Self {
            event_type,
            x,
            y,
            button: Some(MouseButton::Left),
            click_count: Some(1),
            delta_x: None,
            delta_y: None,
            modifiers: 0,
        }
    }

    pub fn wheel_at(x: f64, y: f64, delta_x: f64, delta_y: f64) -> Self {
        Self {
            event_type: MouseEventType::MouseWheel,
            x,
            y,
            button: None,
            click_count: None,
            delta_x: Some(delta_x),
            delta_y: Some(delta_y),
            modifiers: 0,
        }
    }
}

impl Method for DispatchMouseEventParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.dispatchMouseEvent".into()
    }
}

impl Command for DispatchMouseEventParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
    RawKeyDown,
    Char,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchKeyEventParams {
    #[serde(rename = "type")]
    pub event_type: KeyEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_virtual_key_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub modifiers: i64,
}

impl Method for DispatchKeyEventParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.dispatchKeyEvent".into()
    }
}

impl Command for DispatchKeyEventParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertTextParams {
    pub text: String,
}

impl InsertTextParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Method for InsertTextParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Input.insertText".into()
    }
}

impl Command for InsertTextParams {
    type Response = serde_json::Value;
}

/// Modifier bitmask as defined by CDP: Alt=1, Ctrl=2, Meta/Cmd=4, Shift=8.
pub mod modifiers {
    pub const ALT: i64 = 1;
    pub const CTRL: i64 = 2;
    pub const META: i64 = 4;
    pub const SHIFT: i64 = 8;
}
