//! The intent router: an ordered rule table evaluated with first-match
//! semantics. A rule returning `Some` is the answer; `None` falls through
//! to the next rule, and exhausting the table delegates to retrieval.

use crate::intent::{self, Language};
use crate::transaction::{format_amount, Ledger};

/// Everything a rule may inspect. Pure data, no side effects.
pub struct RouteContext<'a> {
  pub query_lower: &'a str,
  pub language: Language,
  pub customer: Option<&'a str>,
  pub product: Option<&'a str>,
  pub ledger: &'a Ledger,
}

type RuleFn = fn(&RouteContext) -> Option<String>;

pub struct Rule {
  pub name: &'static str,
  pub apply: RuleFn,
}

/// Priority order is part of the observable contract: product rules first,
/// then customer rules (ending in a terminal clarification), then global
/// aggregates. Reordering changes answers.
pub const RULES: &[Rule] = &[
  Rule { name: "product-buyers", apply: product_buyers },
  Rule { name: "product-price-details", apply: product_price_details },
  Rule { name: "customer-total", apply: customer_total },
  Rule { name: "customer-purchases", apply: customer_purchases },
  Rule { name: "customer-average", apply: customer_average },
  Rule { name: "customer-unclear", apply: customer_unclear },
  Rule { name: "most-purchased", apply: most_purchased },
  Rule { name: "overall-average", apply: overall_average },
];

/// Run the rule table over a query. `None` means no rule claimed the query
/// and the caller should fall back to similarity retrieval.
pub fn route(query: &str, ledger: &Ledger) -> Option<String> {
  let lowered = query.to_lowercase();
  let query_lower = lowered.trim();

  let customers = ledger.distinct_customers();
  let products = ledger.distinct_products();

  let ctx = RouteContext {
    query_lower,
    language: intent::detect_language(query),
    customer: intent::detect_entity(query_lower, &customers),
    product: intent::detect_entity(query_lower, &products),
    ledger,
  };

  for rule in RULES {
    if let Some(answer) = (rule.apply)(&ctx) {
      tracing::debug!(rule = rule.name, "rule matched");
      return Some(answer);
    }
  }

  None
}

fn product_buyers(ctx: &RouteContext) -> Option<String> {
  let product = ctx.product?;
  if !intent::contains_any(ctx.query_lower, intent::WHO_KEYWORDS) {
    return None;
  }

  let mut buyers: Vec<&str> = Vec::new();
  for t in ctx.ledger.for_product(product) {
    if !buyers.contains(&t.customer.as_str()) {
      buyers.push(&t.customer);
    }
  }

  Some(format!("🛒 **{} kis kis ne kharida:** {}", product, buyers.join(", ")))
}

fn product_price_details(ctx: &RouteContext) -> Option<String> {
  let product = ctx.product?;
  if !intent::contains_any(ctx.query_lower, intent::PRICE_KEYWORDS) {
    return None;
  }

  let mut response = format!("🧾 **{product} purchase details:**\n");
  for t in ctx.ledger.for_product(product) {
    response.push_str(&format!(
      "- {} ne ₹{} me {} ko kharida\n",
      t.customer,
      format_amount(t.amount),
      t.date
    ));
  }

  Some(response)
}

fn customer_total(ctx: &RouteContext) -> Option<String> {
  let customer = ctx.customer?;
  if !intent::contains_any(ctx.query_lower, intent::TOTAL_KEYWORDS) {
    return None;
  }

  let total = ctx.ledger.total_for(customer);
  Some(format!("💰 **{} ka total spending:** ₹{}", customer, format_amount(total)))
}

fn customer_purchases(ctx: &RouteContext) -> Option<String> {
  let customer = ctx.customer?;
  if !intent::contains_any(ctx.query_lower, intent::PURCHASE_KEYWORDS) {
    return None;
  }

  let mut response = match ctx.language {
    Language::Hi => format!("📜 **{customer} ne yeh cheezein kharidi hain:**\n"),
    Language::En => format!("📜 **{customer} made the following purchases:**\n"),
  };

  for t in ctx.ledger.for_customer(customer) {
    response.push_str(&format!("- {} ₹{} ({})\n", t.product, format_amount(t.amount), t.date));
  }

  Some(response)
}

fn customer_average(ctx: &RouteContext) -> Option<String> {
  let customer = ctx.customer?;
  if !intent::contains_any(ctx.query_lower, intent::AVERAGE_KEYWORDS) {
    return None;
  }

  Some(format!(
    "📊 **{} ka average order value:** ₹{:.2}",
    customer,
    ctx.ledger.mean_for(customer)
  ))
}

/// Terminal branch: a customer was named but no intent matched. Never
/// falls through to the global rules or retrieval.
fn customer_unclear(ctx: &RouteContext) -> Option<String> {
  let customer = ctx.customer?;

  Some(format!(
    "❓ **{customer} ke liye query clear nahi hai.**\n\
     Try asking: total spending, purchase history, or average order."
  ))
}

fn most_purchased(ctx: &RouteContext) -> Option<String> {
  if !ctx.query_lower.contains("most") {
    return None;
  }

  let product = ctx.ledger.most_purchased_product()?;
  Some(format!("🔥 **Sabse zyada kharida gaya product:** {product}"))
}

fn overall_average(ctx: &RouteContext) -> Option<String> {
  if !ctx.query_lower.contains("average order") {
    return None;
  }

  Some(format!("📊 **Overall average order value:** ₹{:.2}", ctx.ledger.overall_mean()))
}
