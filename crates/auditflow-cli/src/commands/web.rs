use anyhow::Result;
use auditflow_core::AuditService;

#[derive(Debug, Clone, Copy)]
pub(super) struct WebServeOptions<'a> {
    pub(super) host: &'a str,
    pub(super) port: u16,
}

pub(super) fn serve(service: &AuditService, options: WebServeOptions<'_>) -> Result<()> {
    auditflow_web::serve_web(service.clone(), options.host, options.port)
}
