//! Storefront response payloads and their mapping to core gateway types.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use cartsync_core::error::{CartError, Result};
use cartsync_core::{CartAttribute, CartLineInput, RemoteCart, RemoteLine, UserError};

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload {
    #[serde(default)]
    cart: Option<CartDto>,
    #[serde(default)]
    user_errors: Vec<UserErrorDto>,
}

#[derive(Debug, Deserialize)]
struct UserErrorDto {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDto {
    id: String,
    #[serde(default)]
    checkout_url: Option<String>,
    #[serde(default)]
    lines: Option<Connection<LineDto>>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct LineDto {
    id: String,
    #[serde(default)]
    quantity: Option<u32>,
    #[serde(default)]
    merchandise: Option<MerchandiseDto>,
}

#[derive(Debug, Deserialize)]
struct MerchandiseDto {
    #[serde(default)]
    id: Option<String>,
}

impl From<UserErrorDto> for UserError {
    fn from(dto: UserErrorDto) -> Self {
        UserError {
            field: dto.field.unwrap_or_default(),
            message: dto.message,
            code: dto.code,
        }
    }
}

impl From<CartDto> for RemoteCart {
    fn from(dto: CartDto) -> Self {
        let lines = dto
            .lines
            .map(|conn| conn.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| {
                let line = edge.node;
                RemoteLine {
                    id: line.id,
                    merchandise_id: line
                        .merchandise
                        .and_then(|m| m.id)
                        .unwrap_or_default(),
                    quantity: line.quantity,
                }
            })
            .collect();

        RemoteCart {
            id: dto.id,
            checkout_url: dto.checkout_url,
            lines,
        }
    }
}

/// Maps a decoded GraphQL response for `operation` onto a cart or a typed failure.
pub fn parse_cart_response(operation: &str, response: GraphqlResponse) -> Result<RemoteCart> {
    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(CartError::transport(format!(
            "{} failed: {}",
            operation,
            messages.join("; ")
        )));
    }

    let payload = response
        .data
        .and_then(|mut data| data.remove(operation))
        .filter(|value| !value.is_null())
        .ok_or_else(|| CartError::empty_result(operation))?;

    let payload: MutationPayload = serde_json::from_value(payload).map_err(|e| {
        CartError::transport(format!("Malformed {} payload: {}", operation, e))
    })?;

    if !payload.user_errors.is_empty() {
        return Err(CartError::RemoteValidation(
            payload.user_errors.into_iter().map(UserError::from).collect(),
        ));
    }

    payload
        .cart
        .map(RemoteCart::from)
        .ok_or_else(|| CartError::empty_result(operation))
}

// ============================================================================
// Request variables
// ============================================================================

pub fn create_variables(lines: &[CartLineInput], attributes: &[CartAttribute]) -> Value {
    json!({
        "input": {
            "lines": lines,
            "attributes": attributes,
        }
    })
}

pub fn add_variables(cart_id: &str, lines: &[CartLineInput]) -> Value {
    json!({ "cartId": cart_id, "lines": lines })
}

pub fn update_variables(cart_id: &str, line_ids: &[String], quantity: u32) -> Value {
    let lines: Vec<Value> = line_ids
        .iter()
        .map(|id| json!({ "id": id, "quantity": quantity }))
        .collect();
    json!({ "cartId": cart_id, "lines": lines })
}

pub fn remove_variables(cart_id: &str, line_ids: &[String]) -> Value {
    json!({ "cartId": cart_id, "lineIds": line_ids })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> GraphqlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_success() {
        let body = response(json!({
            "data": {
                "cartCreate": {
                    "cart": {
                        "id": "gid://shopify/Cart/1",
                        "checkoutUrl": "https://shop.test/cart/c/1",
                        "cost": {
                            "subtotalAmount": {"amount": "95.0", "currencyCode": "USD"},
                            "totalAmount": {"amount": "95.0", "currencyCode": "USD"}
                        },
                        "lines": {"edges": [
                            {"node": {
                                "id": "gid://shopify/CartLine/A",
                                "quantity": 1,
                                "cost": {
                                    "amountPerQuantity": {"amount": "95.0", "currencyCode": "USD"},
                                    "totalAmount": {"amount": "95.0", "currencyCode": "USD"}
                                },
                                "merchandise": {"id": "gid://shopify/ProductVariant/2"}
                            }},
                            {"node": {"id": "gid://shopify/CartLine/B", "quantity": 1, "merchandise": {}}}
                        ]}
                    },
                    "userErrors": []
                }
            }
        }));

        let cart = parse_cart_response("cartCreate", body).unwrap();
        assert_eq!(cart.id, "gid://shopify/Cart/1");
        assert_eq!(cart.checkout_url.as_deref(), Some("https://shop.test/cart/c/1"));
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].merchandise_id, "gid://shopify/ProductVariant/2");
        assert_eq!(cart.lines[0].quantity, Some(1));
        assert_eq!(cart.lines[1].merchandise_id, "");
    }

    #[test]
    fn test_parse_user_errors() {
        let body = response(json!({
            "data": {
                "cartLinesAdd": {
                    "cart": null,
                    "userErrors": [{"field": null, "message": "Size 3 is sold out", "code": "INVALID"}]
                }
            }
        }));

        match parse_cart_response("cartLinesAdd", body) {
            Err(CartError::RemoteValidation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "Size 3 is sold out");
                assert!(errors[0].field.is_empty());
            }
            other => panic!("Expected RemoteValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_null_cart_is_empty_result() {
        let body = response(json!({
            "data": {"cartLinesRemove": {"cart": null, "userErrors": []}}
        }));
        let result = parse_cart_response("cartLinesRemove", body);
        assert!(matches!(result, Err(CartError::EmptyResult { .. })));
    }

    #[test]
    fn test_parse_missing_payload_is_empty_result() {
        let body = response(json!({"data": {"cartLinesUpdate": null}}));
        let result = parse_cart_response("cartLinesUpdate", body);
        assert!(matches!(result, Err(CartError::EmptyResult { .. })));
    }

    #[test]
    fn test_parse_top_level_errors_is_transport() {
        let body = response(json!({"errors": [{"message": "Throttled"}]}));
        let result = parse_cart_response("cartCreate", body);
        assert!(matches!(result, Err(CartError::Transport { .. })));
    }

    #[test]
    fn test_update_variables_cover_every_line() {
        let vars = update_variables("C1", &["L1".to_string(), "L1w".to_string()], 3);
        assert_eq!(
            vars,
            json!({
                "cartId": "C1",
                "lines": [{"id": "L1", "quantity": 3}, {"id": "L1w", "quantity": 3}]
            })
        );
    }

    #[test]
    fn test_create_variables_shape() {
        let lines = vec![
            CartLineInput::new("V1", 1).with_selling_plan("SP1"),
            CartLineInput::new("V2", 1),
        ];
        let attrs = vec![CartAttribute::new("type", "auto_renew")];
        let vars = create_variables(&lines, &attrs);

        assert_eq!(vars["input"]["lines"][0]["merchandiseId"], "V1");
        assert_eq!(vars["input"]["lines"][0]["sellingPlanId"], "SP1");
        assert!(vars["input"]["lines"][1].get("sellingPlanId").is_none());
        assert_eq!(vars["input"]["attributes"][0]["key"], "type");
    }
}
