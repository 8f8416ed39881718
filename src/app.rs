//! Browser front end.
//!
//! Binds the upload page's elements to the pipeline: picking a file resets
//! the page, the process button reads the file, encodes it and exposes the
//! result through the download link.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Document, Event, File, HtmlAnchorElement, HtmlElement,
    HtmlInputElement, Url,
};

use crate::pipeline::{process, EncodedFile, Outcome};

pub const UPLOAD_ID: &str = "upload";
pub const PROCESS_BUTTON_ID: &str = "processButton";
pub const STATUS_ID: &str = "status";
pub const DOWNLOAD_ID: &str = "downloadButton";

const MSG_NO_FILE: &str = "Please upload an Excel file first.";
const MSG_NO_DATA: &str = "No data available in the 3rd column (Message column) to encode.";
const MSG_SUCCESS: &str = "File processed successfully! Click \"Download Encoded File\" to download.";

/// Page elements the app drives.
#[derive(Clone)]
struct Elements {
    upload: HtmlInputElement,
    process_button: HtmlElement,
    status: HtmlElement,
    download: HtmlAnchorElement,
}

impl Elements {
    fn find(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            upload: element_by_id(document, UPLOAD_ID)?,
            process_button: element_by_id(document, PROCESS_BUTTON_ID)?,
            status: element_by_id(document, STATUS_ID)?,
            download: element_by_id(document, DOWNLOAD_ID)?,
        })
    }

    fn set_status(&self, text: &str) {
        self.status.set_text_content(Some(text));
    }

    fn show_download(&self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        let _ = self.download.style().set_property("display", display);
    }
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}

/// Object URL of the current download, revoked when replaced.
#[derive(Default)]
struct AppState {
    download_url: Option<String>,
}

impl AppState {
    fn revoke(&mut self) {
        if let Some(url) = self.download_url.take() {
            let _ = Url::revoke_object_url(&url);
        }
    }
}

/// The upload page, exported to JavaScript.
///
/// Event handlers stay registered for as long as this object is alive.
#[wasm_bindgen]
pub struct EncoderApp {
    #[allow(dead_code)]
    change_closure: Closure<dyn FnMut(Event)>,
    #[allow(dead_code)]
    click_closure: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
impl EncoderApp {
    /// Find the page elements and wire up their handlers.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<EncoderApp, JsValue> {
        console_error_panic_hook::set_once();

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let elements = Elements::find(&document)?;
        let state = Rc::new(RefCell::new(AppState::default()));

        // New file selected: forget the previous run
        let change_closure = {
            let elements = elements.clone();
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move |_event: Event| {
                elements.set_status("");
                elements.show_download(false);
                state.borrow_mut().revoke();
            }) as Box<dyn FnMut(Event)>)
        };
        elements
            .upload
            .add_event_listener_with_callback("change", change_closure.as_ref().unchecked_ref())?;

        let click_closure = {
            let elements = elements.clone();
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move |_event: Event| {
                let Some(file) = elements.upload.files().and_then(|files| files.get(0)) else {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(MSG_NO_FILE);
                    }
                    return;
                };
                let elements = elements.clone();
                let state = Rc::clone(&state);
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = run(&elements, &state, &file).await {
                        web_sys::console::error_1(&e);
                        let text = e.as_string().unwrap_or_else(|| "unknown error".to_string());
                        elements.set_status(&format!("Error: {text}"));
                    }
                });
            }) as Box<dyn FnMut(Event)>)
        };
        elements
            .process_button
            .add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;

        Ok(EncoderApp {
            change_closure,
            click_closure,
        })
    }
}

async fn run(
    elements: &Elements,
    state: &Rc<RefCell<AppState>>,
    file: &File,
) -> Result<(), JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let data = Uint8Array::new(&buffer).to_vec();

    match process(&data, &file.name())? {
        Outcome::NoMessageData => {
            elements.set_status(MSG_NO_DATA);
        }
        Outcome::Processed(encoded) => {
            let url = object_url(&encoded)?;
            elements.download.set_href(&url);
            elements.download.set_download(&encoded.file_name);
            {
                let mut s = state.borrow_mut();
                s.revoke();
                s.download_url = Some(url);
            }
            elements.show_download(true);
            elements.set_status(MSG_SUCCESS);
        }
    }
    Ok(())
}

fn object_url(encoded: &EncodedFile) -> Result<String, JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(encoded.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(encoded.container.mime_type());
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    Url::create_object_url_with_blob(&blob)
}
