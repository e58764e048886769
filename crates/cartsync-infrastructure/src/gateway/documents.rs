//! GraphQL documents for the storefront cart API.

const CART_FRAGMENT: &str = r#"
fragment CartFields on Cart {
  id
  checkoutUrl
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        merchandise {
          ... on ProductVariant { id }
        }
      }
    }
  }
}
"#;

const CART_CREATE: &str = r#"
mutation cartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}
"#;

const CART_LINES_ADD: &str = r#"
mutation cartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}
"#;

const CART_LINES_UPDATE: &str = r#"
mutation cartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}
"#;

const CART_LINES_REMOVE: &str = r#"
mutation cartLinesRemove($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { field message code }
  }
}
"#;

/// The four cart mutations. The operation name doubles as the key of the
/// mutation payload in the response `data` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    Create,
    LinesAdd,
    LinesUpdate,
    LinesRemove,
}

impl CartMutation {
    pub fn operation(&self) -> &'static str {
        match self {
            CartMutation::Create => "cartCreate",
            CartMutation::LinesAdd => "cartLinesAdd",
            CartMutation::LinesUpdate => "cartLinesUpdate",
            CartMutation::LinesRemove => "cartLinesRemove",
        }
    }

    /// Full query document including the shared cart fragment.
    pub fn document(&self) -> String {
        let body = match self {
            CartMutation::Create => CART_CREATE,
            CartMutation::LinesAdd => CART_LINES_ADD,
            CartMutation::LinesUpdate => CART_LINES_UPDATE,
            CartMutation::LinesRemove => CART_LINES_REMOVE,
        };
        format!("{}{}", body, CART_FRAGMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_fragment() {
        for mutation in [
            CartMutation::Create,
            CartMutation::LinesAdd,
            CartMutation::LinesUpdate,
            CartMutation::LinesRemove,
        ] {
            let doc = mutation.document();
            assert!(doc.contains(mutation.operation()));
            assert!(doc.contains("fragment CartFields on Cart"));
            assert!(doc.contains("userErrors"));
        }
    }
}
