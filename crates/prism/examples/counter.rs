//! Minimal embedding: a counter whose state lives on the host side.
//!
//! Run with `RUST_LOG=debug cargo run --example counter`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use prism::{Config, Session, StaticSite};

const INDEX: &str = r#"<!doctype html>
<html>
  <body>
    <h1>Counter</h1>
    <button onclick="render(bump(1))">+1</button>
    <script>
      function render(value) {
        document.querySelector('h1').textContent = 'Counter: ' + value;
      }
    </script>
  </body>
</html>"#;

fn main() -> Result<()> {
    env_logger::init();

    let mut session = Session::new(Config::new("Counter", 400, 300));

    let count = Rc::new(RefCell::new(0.0));
    let state = count.clone();
    session.bind("bump", move |by: f64| {
        *state.borrow_mut() += by;
        *state.borrow()
    })?;

    let url = session.start(Arc::new(StaticSite::new().index(INDEX)))?;
    println!("serving document at {url}");

    // Without a renderer attached, drive the script context directly.
    let value: f64 = session.eval("bump(1) + bump(1)")?;
    println!("counter after two bumps: {value}");
    assert_eq!(*count.borrow(), 2.0);

    Ok(())
}
