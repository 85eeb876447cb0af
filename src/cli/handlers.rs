use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::cli::commands::*;
use crate::cli::output::{OutputFormat, FORMATTER};
use crate::core::registry::ProviderRegistry;
use crate::core::runtime::RuntimeKind;
use crate::core::service::RuntimeService;
use crate::core::setup::{apply_project, ProjectFile};
use crate::error::{AemError, AemResult};
use crate::infrastructure::config::Config;
use crate::infrastructure::remote::{HttpClient, HttpTransport, Platform};
use crate::infrastructure::settings::SettingsStore;

/// 命令处理器
pub struct CommandHandler {
    config: Config,
    registry: ProviderRegistry,
    node: RuntimeService,
    java: RuntimeService,
}

impl CommandHandler {
    /// 创建新的命令处理器
    pub fn new(config: Config) -> AemResult<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(HttpClient::new()?);
        Self::with_transport(config, transport, Platform::current())
    }

    /// 使用指定的传输和平台创建命令处理器
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        platform: Platform,
    ) -> AemResult<Self> {
        debug!("home: {}, platform: {}", config.home.display(), platform);

        let registry = ProviderRegistry::with_defaults(&config, transport.clone(), platform);
        let settings = Arc::new(SettingsStore::new(config.settings_path()));

        let build = |kind: RuntimeKind| -> AemResult<RuntimeService> {
            let provider = registry.get(kind.as_str()).ok_or_else(|| {
                AemError::validation("module", format!("no provider registered for {kind}"))
            })?;
            Ok(RuntimeService::new(
                kind,
                &config,
                provider,
                transport.clone(),
                settings.clone(),
            ))
        };
        let node = build(RuntimeKind::Node)?;
        let java = build(RuntimeKind::Java)?;

        Ok(Self {
            config,
            registry,
            node,
            java,
        })
    }

    /// 指定运行时的服务
    pub fn service(&self, kind: RuntimeKind) -> &RuntimeService {
        match kind {
            RuntimeKind::Node => &self.node,
            RuntimeKind::Java => &self.java,
        }
    }

    /// 处理命令
    pub async fn handle_command(&self, command: Commands) -> AemResult<()> {
        match command {
            Commands::Node { action } => self.handle_runtime_command(RuntimeKind::Node, action).await,
            Commands::Java { action } => self.handle_runtime_command(RuntimeKind::Java, action).await,
            Commands::List { module, filter } => self.handle_remote_list(&module, filter.as_deref()).await,
            Commands::Setup { file } => self.handle_setup(&file).await,
        }
    }

    /// 处理单个运行时的命令
    async fn handle_runtime_command(&self, kind: RuntimeKind, action: RuntimeCommands) -> AemResult<()> {
        let service = self.service(kind);
        match action {
            RuntimeCommands::Install { version } => {
                let installed = service.install(&version).await?;
                println!("Installed {kind} {installed}");
            }
            RuntimeCommands::Use { version } => {
                let active = service.use_version(&version, self.config.symlink_for(kind))?;
                println!("Now using {kind} {active}");
            }
            RuntimeCommands::List { json } => {
                let installed = service.list()?;
                let current = service.current()?;
                let output = FORMATTER.format_installed(
                    kind,
                    current.as_deref(),
                    &installed,
                    OutputFormat::from_json_flag(json),
                )?;
                print!("{output}");
            }
            RuntimeCommands::Current { json } => {
                let current = service.current()?;
                let output =
                    FORMATTER.format_current(kind, current.as_deref(), OutputFormat::from_json_flag(json))?;
                print!("{output}");
            }
            RuntimeCommands::Uninstall { version } => {
                if service.uninstall(&version)? {
                    println!("Uninstalled {kind} {}", version.trim());
                } else {
                    println!("{kind} {} is not installed", version.trim());
                }
            }
        }
        Ok(())
    }

    /// 通过提供者注册表查询远程版本
    async fn handle_remote_list(&self, module: &str, filter: Option<&str>) -> AemResult<()> {
        let name = module
            .parse::<RuntimeKind>()
            .map(|kind| kind.as_str().to_string())
            .unwrap_or_else(|_| module.trim().to_lowercase());

        let provider = self.registry.get(&name).ok_or_else(|| {
            AemError::validation(
                "module",
                format!(
                    "unknown module '{module}', available: {}",
                    self.registry.names().join(", ")
                ),
            )
        })?;

        let versions = provider.list_versions(filter).await?;
        print!("{}", FORMATTER.format_remote(&name, &versions));
        Ok(())
    }

    /// 按项目文件安装并启用运行时
    async fn handle_setup(&self, file: &Path) -> AemResult<()> {
        let project = ProjectFile::load(file)?;
        let applied = apply_project(&project, &[&self.node, &self.java], &self.config).await?;
        if applied.is_empty() {
            println!("Nothing to set up in {}", file.display());
        }
        for (kind, version) in applied {
            println!("Now using {kind} {version}");
        }
        Ok(())
    }
}
