use anyhow::{Context, Result};
use launchdash::config::Config;
use launchdash::data::{Dataset, DatasetManifest};
use launchdash::logging::{self, log, log_dataset_loaded, obj, ts_now, v_str, Domain, Level, ProfileScope};
use launchdash::server::{self, AppState};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("data_path", v_str(&cfg.data_path)),
            ("bind_addr", v_str(&cfg.bind_addr)),
            ("pie_aggregate", v_str(&cfg.pie_aggregate.to_string())),
        ]),
    );

    // Bad input data is the one fatal error: stop before serving.
    let path = Path::new(&cfg.data_path);
    let loaded = {
        let _scope = ProfileScope::new("dataset_load");
        Dataset::load(path)
    };
    let dataset = match loaded {
        Ok(ds) => ds,
        Err(err) => {
            log(
                Level::Fatal,
                Domain::Data,
                "dataset_invalid",
                obj(&[("msg", v_str(&format!("{:#}", err)))]),
            );
            logging::flush();
            return Err(err);
        }
    };
    let (lo, hi) = dataset.payload_bounds().unwrap_or((cfg.slider.min, cfg.slider.max));
    log_dataset_loaded(dataset.source(), dataset.len(), dataset.sites().len(), lo, hi);

    let manifest = DatasetManifest::build(path, &dataset, ts_now())
        .context("building dataset manifest")?;
    log(
        Level::Info,
        Domain::Data,
        "manifest",
        obj(&[("hash_sha256", v_str(&manifest.hash_sha256))]),
    );

    let state = AppState::new(&cfg, dataset, Some(manifest));
    server::serve(cfg, state).await
}
