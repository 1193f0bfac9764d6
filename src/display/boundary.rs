use std::panic::{self, AssertUnwindSafe};

pub fn render_guarded<F>(fallback: &str, render: F) -> String
where
    F: FnOnce() -> String,
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(text) => text,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Rendering failed: {}", reason);
            fallback.to_string()
        }
    }
}
