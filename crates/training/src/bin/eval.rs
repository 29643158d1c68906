use burn::tensor::backend::Backend;
use clap::Parser;
use cli_support::ConfigFile;
use graph_data::{LinkDataset, SplitKind};
use training::settings::resolve_data;
use training::{append_result, evaluate_split, load_checkpoint, EvalArgs, LinkTensors, TrainBackend};

fn main() -> anyhow::Result<()> {
    cli_support::init_tracing("info");
    let args = EvalArgs::parse();
    cli_support::validate_backend_choice(args.backend).map_err(|e| anyhow::anyhow!(e))?;

    let file = ConfigFile::load(args.config.as_deref())?;
    let (paths, _) = resolve_data(&args.data, &file);
    let mut dataset = LinkDataset::load(&paths)?;

    let device = <TrainBackend as Backend>::Device::default();
    let (model, meta) = load_checkpoint::<TrainBackend>(&args.checkpoint, &device)?;
    if meta.model.in_dim != dataset.graph.feature_dim {
        anyhow::bail!(
            "checkpoint expects {} input features, graph has {}",
            meta.model.in_dim,
            dataset.graph.feature_dim
        );
    }
    // Evaluate on the same graph structure the model was trained on.
    if meta.self_loops {
        dataset.graph.add_self_loops();
    }

    let data = LinkTensors::<TrainBackend>::from_dataset(&dataset, &device);
    let metrics = evaluate_split(&model, &data, SplitKind::Test)?;
    println!("{}", metrics.result_line());
    tracing::info!(
        checkpoint = %args.checkpoint.display(),
        run = meta.run,
        best_epoch = ?meta.best_epoch,
        "evaluation complete"
    );

    if let Some(path) = &args.result_path {
        append_result(path, &metrics)?;
    }
    Ok(())
}
