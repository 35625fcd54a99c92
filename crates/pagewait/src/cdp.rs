//! Chrome `DevTools` Protocol driver.
//!
//! [`CdpDriver`] implements [`WebDriver`] on top of chromiumoxide. The driver
//! owns a tokio runtime and blocks on it for every call, so page objects stay
//! synchronous.
//!
//! Located elements live in a page-side registry (`window.__pagewait`) keyed
//! by handle id. A navigation wipes the registry, after which old handles
//! report [`PageError::StaleElement`].

use crate::driver::{ElementHandle, WebDriver};
use crate::locator::By;
use crate::result::{PageError, PageResult};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::fmt;
use std::sync::Mutex;
use tokio::runtime::Runtime;

const REGISTRY: &str =
    "(window.__pagewait || (window.__pagewait = { next: 0, els: {}, ids: new WeakMap() }))";

const IS_DISPLAYED: &str = "el => { const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
    return s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0' \
    && r.width > 0 && r.height > 0; }";

const IS_ENABLED: &str = "el => !el.disabled";

const CLICK: &str = "el => { el.scrollIntoView({ block: 'center' }); el.click(); return true; }";

const CLEAR: &str = "el => { if ('value' in el) { el.value = ''; \
    el.dispatchEvent(new Event('input', { bubbles: true })); \
    el.dispatchEvent(new Event('change', { bubbles: true })); } \
    else if (el.isContentEditable) { el.textContent = ''; } return true; }";

const FOCUS: &str = "el => { el.focus(); return true; }";

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Reply envelope of every element script
#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    stale: bool,
    #[serde(default)]
    ok: serde_json::Value,
}

/// Blocking CDP-backed driver
pub struct CdpDriver {
    runtime: Runtime,
    browser: Mutex<Browser>,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
}

impl fmt::Debug for CdpDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpDriver").finish_non_exhaustive()
    }
}

impl CdpDriver {
    /// Launch a browser and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the runtime or the browser cannot be started
    pub fn launch(config: BrowserConfig) -> PageResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| PageError::BrowserLaunch { message })?;

        let (browser, handler, page) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(cdp_config)
                .await
                .map_err(|e| PageError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| PageError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            Ok::<_, PageError>((browser, handler, page))
        })?;

        tracing::info!(headless = config.headless, "browser launched");
        Ok(Self {
            runtime,
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    /// Navigate the page to `url`
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails
    pub fn goto(&self, url: &str) -> PageResult<()> {
        tracing::debug!(url, "navigating");
        self.runtime
            .block_on(self.page.goto(url))
            .map_err(|e| PageError::driver(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    /// URL of the current document
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be queried
    pub fn current_url(&self) -> PageResult<Option<String>> {
        self.runtime
            .block_on(self.page.url())
            .map_err(|e| PageError::driver(e.to_string()))
    }

    fn eval(&self, script: &str) -> PageResult<serde_json::Value> {
        let result = self
            .runtime
            .block_on(self.page.evaluate(script))
            .map_err(|e| PageError::driver(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| PageError::driver(e.to_string()))
    }

    /// Run `function` against the registered element and unwrap the reply
    fn on_element(&self, element: &ElementHandle, function: &str) -> PageResult<serde_json::Value> {
        let script = format!(
            "(() => {{ const el = {REGISTRY}.els[{id:?}]; \
             if (!el || !el.isConnected) return {{ stale: true }}; \
             return {{ ok: ({function})(el) }}; }})()",
            id = element.id,
        );
        let reply: Reply = serde_json::from_value(self.eval(&script)?)?;
        if reply.stale {
            return Err(PageError::StaleElement {
                id: element.id.clone(),
            });
        }
        Ok(reply.ok)
    }

    fn on_element_bool(&self, element: &ElementHandle, function: &str) -> PageResult<bool> {
        Ok(self.on_element(element, function)?.as_bool().unwrap_or(false))
    }

    /// Register every match of `query` and return handles for them
    fn register(&self, root: Option<&ElementHandle>, by: &By) -> PageResult<Vec<ElementHandle>> {
        let root_expr = match root {
            Some(root) => format!("{REGISTRY}.els[{:?}]", root.id),
            None => "document".to_string(),
        };
        let script = register_script(&root_expr, by);
        let reply: Reply = serde_json::from_value(self.eval(&script)?)?;
        if reply.stale {
            return Err(PageError::StaleElement {
                id: root.map(|r| r.id.clone()).unwrap_or_default(),
            });
        }
        let handles: Vec<ElementHandle> = serde_json::from_value(reply.ok)?;
        tracing::trace!(locator = %by, found = handles.len(), "located elements");
        Ok(handles)
    }

    fn interact(&self, element: &ElementHandle, function: &str) -> PageResult<()> {
        if !self.on_element_bool(element, IS_ENABLED)? {
            return Err(PageError::ElementNotInteractable {
                id: element.id.clone(),
                message: "element is disabled".to_string(),
            });
        }
        self.on_element(element, function)?;
        Ok(())
    }
}

/// Script locating `by` under `root_expr` and registering the matches.
///
/// A node keeps its id across lookups and detached nodes are dropped from the
/// registry, so repeated polling does not grow it.
fn register_script(root_expr: &str, by: &By) -> String {
    let query = by.to_query_all("root");
    format!(
        "(() => {{ const reg = {REGISTRY}; const root = {root_expr}; \
         if (!root || (root !== document && !root.isConnected)) return {{ stale: true }}; \
         for (const key of Object.keys(reg.els)) {{ if (!reg.els[key].isConnected) delete reg.els[key]; }} \
         return {{ ok: {query}.map(el => {{ let id = reg.ids.get(el); \
         if (id === undefined || reg.els[id] !== el) {{ id = 'pw-' + (reg.next++); reg.ids.set(el, id); reg.els[id] = el; }} \
         return {{ id, tag_name: el.tagName.toLowerCase() }}; }}) }}; }})()"
    )
}

impl WebDriver for CdpDriver {
    fn find_elements(&self, by: &By) -> PageResult<Vec<ElementHandle>> {
        self.register(None, by)
    }

    fn find_elements_in(&self, root: &ElementHandle, by: &By) -> PageResult<Vec<ElementHandle>> {
        self.register(Some(root), by)
    }

    fn is_displayed(&self, element: &ElementHandle) -> PageResult<bool> {
        self.on_element_bool(element, IS_DISPLAYED)
    }

    fn is_enabled(&self, element: &ElementHandle) -> PageResult<bool> {
        self.on_element_bool(element, IS_ENABLED)
    }

    fn click(&self, element: &ElementHandle) -> PageResult<()> {
        self.interact(element, CLICK)
    }

    fn clear(&self, element: &ElementHandle) -> PageResult<()> {
        self.interact(element, CLEAR)
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> PageResult<()> {
        self.interact(element, FOCUS)?;
        let params = InsertTextParams::builder()
            .text(text)
            .build()
            .map_err(PageError::driver)?;
        self.runtime
            .block_on(self.page.execute(params))
            .map_err(|e| PageError::driver(e.to_string()))?;
        Ok(())
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        let browser = self
            .browser
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = self.runtime.block_on(browser.close()) {
            tracing::warn!(error = %e, "failed to close browser");
        }
        self.handler.abort();
    }
}
