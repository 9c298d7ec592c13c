//! Stdio MCP server exposing the follow-up tools.
//!
//! Framing, dispatch and request concurrency come from `rmcp`; each tool call
//! is one full round-trip through a new terminal window.

pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use followup_core::materializer::current_program;
use followup_core::{AskRequest, Config, Launcher, ask_with};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tracing::info;

use self::tools::{AskArgs, ConfirmArgs};

const SERVER_NAME: &str = "followup";

/// Shared state of all tool calls.
pub struct ServerContext {
    pub config: Config,
    pub launcher: Launcher,
    /// Executable that hosts the prompt in the new terminal.
    pub program: PathBuf,
}

#[derive(Clone)]
pub struct FollowupServer {
    ctx: Arc<ServerContext>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FollowupServer {
    pub fn new(ctx: ServerContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Ask the user a follow-up question in a new terminal window. The user picks one of the options or types a custom answer."
    )]
    async fn ask_followup_question(
        &self,
        Parameters(args): Parameters<AskArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.ask(tools::ASK_FOLLOWUP_QUESTION, args.into()).await)
    }

    #[tool(description = "Report a finished task and ask the user how to proceed.")]
    async fn confirm_completion(
        &self,
        Parameters(args): Parameters<ConfirmArgs>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.ask(tools::CONFIRM_COMPLETION, args.into()).await)
    }
}

impl FollowupServer {
    async fn ask(&self, tool: &str, request: AskRequest) -> CallToolResult {
        info!(tool, "asking follow-up question");
        let ctx = &self.ctx;
        let outcome = ask_with(&ctx.launcher, request, &ctx.config, &ctx.program).await;
        CallToolResult::success(vec![Content::text(tools::outcome_text(&outcome))])
    }
}

#[tool_handler]
impl ServerHandler for FollowupServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.protocol_version = ProtocolVersion::V_2024_11_05;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(
            "Use ask_followup_question whenever you need input from the user, and \
             confirm_completion before ending a task."
                .to_string(),
        );
        info
    }
}

/// Serves on stdin/stdout until the client disconnects.
///
/// # Errors
/// Returns an error if the executable cannot be located or the handshake
/// fails.
pub async fn serve(config: Config) -> Result<()> {
    let ctx = ServerContext {
        config,
        launcher: Launcher::detect(),
        program: current_program()?,
    };
    info!(timeout = %ctx.config.timeout, "starting follow-up MCP server on stdio");

    let service = FollowupServer::new(ctx)
        .serve(stdio())
        .await
        .context("start MCP server")?;
    let reason = service.waiting().await.context("MCP server task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}
