//! Assemble a small photoblock in memory, resolve its sensor models through
//! the synthetic provider, and print the canonical document.

use photoblock::synthetic::{GridModel, SyntheticProvider};
use photoblock::{Image, ImagePoint, PhotoBlock, TiePoint};

fn main() -> anyhow::Result<()> {
    let mut provider = SyntheticProvider::new();
    provider.register("frame-a.ntf", GridModel::new("FRAME-A", [1000.0, 2000.0], 0.5));
    provider.register("frame-b.ntf", GridModel::new("FRAME-B", [1010.0, 2000.0], 0.5));

    let mut block = PhotoBlock::new();
    block.name = "demo strip".to_owned();
    block.add_image(Image::new("FRAME-A", "frame-a.ntf", "GRID", 0, 1));
    block.add_image(Image::new("FRAME-B", "frame-b.ntf", "GRID", 0, 1));

    block.add_tie_point(TiePoint::new(
        "P1",
        vec![
            ImagePoint::from_sigmas("FRAME-A", 512.0, 384.0, 0.5, 0.5, 0.0),
            ImagePoint::from_sigmas("FRAME-B", 112.0, 388.0, 0.5, 0.5, 0.0),
        ],
    ));

    let models = block.models(&provider)?;
    println!("resolved {} sensor models", models.len());

    println!("{}", serde_json::to_string_pretty(&block.to_document())?);
    Ok(())
}
