//! App Service プランのSKU選択

use blogstack_cloud::resource::Sku;

/// 本番環境のスタック名
pub const PRODUCTION_STACK: &str = "prod";

/// 環境名からSKUを決める
///
/// `prod` は常時起動できる Basic (B1)、それ以外は Free (F1)。
pub fn select_sku(environment: &str) -> Sku {
    if environment == PRODUCTION_STACK {
        Sku {
            name: "B1".to_string(),
            tier: "Basic".to_string(),
        }
    } else {
        Sku {
            name: "F1".to_string(),
            tier: "Free".to_string(),
        }
    }
}
