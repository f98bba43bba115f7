//! blogstack core
//!
//! スタック設定（KDL + Tera）の読み込みと、ブログ用インフラの
//! デプロイ記述子を提供します。
//!
//! ```text
//! blogstack.kdl ──▶ parser ──▶ StackConfig ──▶ TemplateProcessor（選択したスタックのみ）
//!                                                        │ ConfigSource
//!                                                        ▼
//!                        Deployment ◀── build_deployment ◀── DeploySettings
//! ```

pub mod descriptor;
pub mod error;
pub mod hostname;
pub mod loader;
pub mod model;
pub mod parser;
pub mod settings;
pub mod sku;
pub mod source;
pub mod template;

pub use descriptor::{CONTAINER_IMAGE, build_deployment};
pub use error::{DeployError, Result};
pub use hostname::{HostName, split_host};
pub use loader::{LoadedStack, load_deployment, load_deployment_from, load_stack_file};
pub use model::{ConfigValue, StackConfig, StackFile};
pub use parser::parse_stack_file;
pub use settings::{DeploySettings, DomainSettings};
pub use sku::select_sku;
pub use source::{Config, ConfigSource};
pub use template::TemplateProcessor;
