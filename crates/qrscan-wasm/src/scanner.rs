//! The `QrScanner` class exported to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use js_sys::{Function, Promise};
use qrscan_core::{
    render, DropZoneAdapter, EventDisposition, FilePickerAdapter, RqrrDecoder, ScanConfig,
    ScanOrchestrator, UiStateMachine, View,
};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{DragEvent, File, HtmlCanvasElement, HtmlElement, HtmlInputElement};

use crate::browser::{BrowserImageSource, CanvasSurface};
use crate::dom::{DropTarget, InputPicker};
use crate::types::{js_error_message, request_from_file, requests_from_list};

type BrowserOrchestrator = ScanOrchestrator<BrowserImageSource, CanvasSurface, RqrrDecoder>;

/// A QR scanner bound to an offscreen canvas.
///
/// Every state change is serialized and passed to the `on_render` callback:
///
/// ```typescript
/// const scanner = new QrScanner(canvas, (view) => {
///   // view.instruction.kind: "idle" | "loading" | "success" | "error"
///   // view.inputEnabled: boolean
/// });
/// scanner.attach(fileInput, container);
/// ```
#[wasm_bindgen]
pub struct QrScanner {
    orchestrator: Rc<BrowserOrchestrator>,
    listeners: RefCell<Vec<EventListener>>,
}

#[wasm_bindgen]
impl QrScanner {
    /// Create a scanner.
    ///
    /// # Arguments
    /// * `canvas` - Canvas reused as the raster surface (need not be attached to the page)
    /// * `on_render` - Called with the current view immediately and after every transition
    /// * `config` - Optional partial `ScanConfig` object; omitted fields use defaults
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        on_render: Function,
        config: JsValue,
    ) -> Result<QrScanner, JsValue> {
        let config: ScanConfig = if config.is_undefined() || config.is_null() {
            ScanConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let surface = CanvasSurface::new(canvas, config.filter)?;
        let orchestrator = Rc::new(ScanOrchestrator::new(
            config,
            BrowserImageSource,
            surface,
            RqrrDecoder::new(),
        ));
        UiStateMachine::attach(orchestrator.context(), move |view: &View| {
            present(&on_render, view)
        });

        Ok(QrScanner {
            orchestrator,
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Scan a file directly, bypassing the DOM adapters.
    ///
    /// Resolves with the outcome; rejects only if a scan is already running.
    pub fn scan_file(&self, file: File) -> Promise {
        let orchestrator = Rc::clone(&self.orchestrator);
        future_to_promise(async move {
            let outcome = orchestrator
                .scan(request_from_file(file))
                .await
                .map_err(|busy| JsValue::from_str(&busy.to_string()))?;
            serde_wasm_bindgen::to_value(&outcome).map_err(JsValue::from)
        })
    }

    /// The current view, in the same shape passed to `on_render`.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = render(&self.orchestrator.context().state());
        serde_wasm_bindgen::to_value(&view).map_err(JsValue::from)
    }

    /// Whether a new file may be submitted.
    #[wasm_bindgen(getter)]
    pub fn input_enabled(&self) -> bool {
        self.orchestrator.context().input_enabled()
    }

    /// Wire a file input and a drop zone to this scanner.
    ///
    /// The input is disabled while a scan is loading. Listeners live as long
    /// as the scanner. A scanner can be attached once; later calls fail
    /// without registering anything.
    pub fn attach(&self, input: HtmlInputElement, zone: HtmlElement) -> Result<(), JsValue> {
        if !self.listeners.borrow().is_empty() {
            warn!("scanner is already attached");
            return Err(JsValue::from_str("Scanner is already attached"));
        }

        let picker = Rc::new(FilePickerAdapter::new(InputPicker(input.clone())));
        let drop_zone = Rc::new(DropZoneAdapter::new(DropTarget(zone.clone())));

        let disabled_input = input.clone();
        self.orchestrator
            .context()
            .subscribe(move |state| disabled_input.set_disabled(state.is_loading()));

        let mut listeners = self.listeners.borrow_mut();
        let options = EventListenerOptions::enable_prevent_default();

        {
            let orchestrator = Rc::clone(&self.orchestrator);
            let picker = Rc::clone(&picker);
            let source = input.clone();
            listeners.push(EventListener::new(&input, "change", move |_event| {
                let files = requests_from_list(source.files());
                let orchestrator = Rc::clone(&orchestrator);
                let picker = Rc::clone(&picker);
                spawn_local(async move {
                    picker.on_change(&*orchestrator, files).await;
                });
            }));
        }

        {
            let drop_zone = Rc::clone(&drop_zone);
            listeners.push(EventListener::new_with_options(
                &zone,
                "dragover",
                options,
                move |event| {
                    if drop_zone.on_drag_over() == EventDisposition::PreventDefault {
                        event.prevent_default();
                    }
                },
            ));
        }

        {
            let drop_zone = Rc::clone(&drop_zone);
            listeners.push(EventListener::new(&zone, "dragleave", move |_event| {
                drop_zone.on_drag_leave();
            }));
        }

        {
            let orchestrator = Rc::clone(&self.orchestrator);
            listeners.push(EventListener::new_with_options(
                &zone,
                "drop",
                options,
                move |event| {
                    if drop_zone.drop_disposition() == EventDisposition::PreventDefault {
                        event.prevent_default();
                    }
                    let files = event
                        .dyn_ref::<DragEvent>()
                        .and_then(|drag| drag.data_transfer())
                        .and_then(|transfer| transfer.files());
                    let files = requests_from_list(files);

                    let orchestrator = Rc::clone(&orchestrator);
                    let picker = Rc::clone(&picker);
                    let drop_zone = Rc::clone(&drop_zone);
                    spawn_local(async move {
                        drop_zone.on_drop(&picker, &*orchestrator, files).await;
                    });
                },
            ));
        }

        Ok(())
    }
}

fn present(on_render: &Function, view: &View) {
    let value = match serde_wasm_bindgen::to_value(view) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "could not serialize view");
            return;
        }
    };
    if let Err(e) = on_render.call1(&JsValue::NULL, &value) {
        warn!(error = %js_error_message(&e), "render callback threw");
    }
}
