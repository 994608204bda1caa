//! Puffin profiling hookup. The host loop marks frame boundaries with
//! `profiling::finish_frame!`.

/// Start the puffin HTTP server and enable scope collection.
///
/// The returned server must stay alive for as long as profiling data should
/// be served; dropping it stops the endpoint.
pub fn initialize() -> Result<puffin_http::Server, anyhow::Error> {
    let server_addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
    let server = puffin_http::Server::new(&server_addr)?;

    profiling::puffin::set_scopes_on(true);

    Ok(server)
}
