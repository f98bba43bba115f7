use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const STACK_FILE: &str = r#"
project "personal-blog"

stack "prod" {
    config {
        appName "blog"
        appHost "blog.example.com"
        dnsResourceGroup "dns-rg"
        otlpEndpoint "https://otlp.example.net"
        otlpHeaders "{{ env.OTLP_HEADERS | default(value='') }}" secret=#true
    }
    config "azure" {
        location "westeurope"
    }
}

stack "dev" {
    config {
        appName "blog"
    }
    config "azure" {
        location "westeurope"
    }
}
"#;

pub struct TestProject {
    pub root: TempDir,
    config_home: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            config_home: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with_stack_file(content: &str) -> Self {
        let project = Self::new();
        project.write_stack_file(content);
        project
    }

    pub fn write_stack_file(&self, content: &str) {
        fs::write(self.root.path().join("blogstack.kdl"), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// プロジェクト内で実行するコマンド（ユーザー環境の影響を受けない）
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("blogstack").unwrap();
        cmd.current_dir(self.path())
            .env_remove("BLOGSTACK_CONFIG_PATH")
            .env_remove("BLOGSTACK_STACK")
            .env_remove("OTLP_HEADERS")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NO_COLOR", "1");
        cmd
    }
}
