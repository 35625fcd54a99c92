//! Example: Search Page
//!
//! Demonstrates: a derived page object waiting for its fields, then acting
//!
//! Run with: `cargo run --example search_page`
//!
//! Set `RUST_LOG=pagewait=debug` to see every poll.

use pagewait::prelude::*;
use pagewait::{MockDriver, MockElement};
use std::sync::Arc;

#[derive(Debug, PageObject)]
struct SearchPage {
    base: PageBase,
    #[visible]
    query: ElementHandle,
    #[clickable]
    #[page(name = "Search")]
    submit: ElementHandle,
    #[existence]
    results: FindBy,
}

impl SearchPage {
    fn open(base: PageBase) -> PageResult<Self> {
        Self {
            query: base.find_element(&By::name("q"))?,
            submit: base.find_element(&By::css("button.search"))?,
            results: FindBy::id("results"),
            base,
        }
        .loaded()
    }

    fn search(&self, text: &str) -> PageResult<&Self> {
        self.send_keys(&self.query, text, "query")?
            .click_button(&self.submit, "Search")
    }
}

fn main() -> PageResult<()> {
    pagewait::logging::init_tracing(pagewait::logging::DEFAULT_FILTER);

    println!("=== Search Page Example ===\n");

    // 1. A fake browser whose search button takes a few polls to render
    let driver = Arc::new(MockDriver::new());
    driver.add_element(MockElement::new("q", "input").matching(By::name("q")));
    driver.add_element(
        MockElement::new("go", "button")
            .matching(By::css("button.search"))
            .visible_after(2),
    );
    driver.add_element(MockElement::new("results", "div").matching(By::id("results")));

    // 2. Settings from the environment, on top of a short timeout
    let config = PageConfig::new()
        .with_timeout(2_000)
        .with_poll_interval(50)
        .with_env_overrides()?;
    println!(
        "1. Waiting up to {}ms, polling every {}ms",
        config.timeout_ms, config.poll_interval_ms
    );

    // 3. Open the page and search
    let page = SearchPage::open(PageBase::with_config(driver.clone(), &config))?;
    println!("2. {} loaded", page.page_name());
    page.search("rust page objects")?;

    println!(
        "3. Query field now holds {:?}",
        driver.value_of("q").unwrap_or_default()
    );
    println!("4. Driver saw {} calls", driver.history().len());

    println!("\n=== Example Complete ===");
    Ok(())
}
