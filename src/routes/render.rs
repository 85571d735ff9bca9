//! HTML snippets embedded by the storefront theme.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::models::{ResolvedStore, StockOutcome, NO_QUALIFYING_STORE_MESSAGE, OUT_OF_STOCK_MESSAGE};

const STORE_LIST_TEMPLATE: &str = r#"<div class="stock-available">
  <h4>{% if nearby %}Available at these nearby stores:{% else %}Available at these stores:{% endif %}</h4>
  <ul class="store-list">
  {%- for store in stores %}
    <li class="store-item">
      <div class="store-name">{{ store.name }}</div>
      <div class="store-address">{{ store.address }}</div>
      {%- if store.phone %}
      <div class="store-phone">📞 {{ store.phone }}</div>
      {%- endif %}
      <div class="store-stock">
        <strong>{{ store.available }}</strong> in stock{% if store.distance %} • <span class="store-distance">{{ store.distance }} miles away</span>{% endif %}
      </div>
    </li>
  {%- endfor %}
  </ul>
</div>"#;

const MESSAGE_TEMPLATE: &str = r#"<p class="{{ class }}">{{ message }}</p>"#;

#[derive(Debug, Serialize)]
struct StoreView<'a> {
    name: &'a str,
    address: String,
    phone: Option<&'a str>,
    available: u64,
    distance: Option<String>,
}

impl<'a> From<&'a ResolvedStore> for StoreView<'a> {
    fn from(store: &'a ResolvedStore) -> Self {
        let mut address = store.address_line.clone();
        if !store.city.is_empty() {
            address.push_str(", ");
            address.push_str(&store.city);
        }
        if !store.postal_code.is_empty() {
            address.push(' ');
            address.push_str(&store.postal_code);
        }

        Self {
            name: &store.name,
            address: address.trim().to_string(),
            phone: store.phone.as_deref(),
            available: store.available,
            distance: store.distance_miles.map(|d| format!("{:.1}", d)),
        }
    }
}

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    // .html names switch on HTML auto-escaping
    env.add_template("store_list.html", STORE_LIST_TEMPLATE)?;
    env.add_template("message.html", MESSAGE_TEMPLATE)?;
    Ok(env)
}

/// Render a resolution outcome as a storefront snippet
pub fn render_outcome(outcome: &StockOutcome) -> Result<String, minijinja::Error> {
    match outcome {
        StockOutcome::Stores(list) => {
            let env = environment()?;
            let stores: Vec<StoreView<'_>> = list.stores.iter().map(StoreView::from).collect();
            env.get_template("store_list.html")?
                .render(context! { nearby => list.ranked, stores => stores })
        }
        StockOutcome::OutOfStock => render_message("no-stock", OUT_OF_STOCK_MESSAGE),
        StockOutcome::NoQualifyingStore => render_message("no-stock", NO_QUALIFYING_STORE_MESSAGE),
    }
}

/// Render an error paragraph
pub fn render_error(message: &str) -> Result<String, minijinja::Error> {
    render_message("error", message)
}

fn render_message(class: &str, message: &str) -> Result<String, minijinja::Error> {
    let env = environment()?;
    env.get_template("message.html")?
        .render(context! { class => class, message => message })
}
