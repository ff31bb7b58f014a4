use std::{env, error::Error, path::PathBuf};

use glam::{IVec3, Vec3};
use log::info;
use rs_voxie_world::{
    config::WorldConfig,
    renderer::MemorySink,
    simulation::Simulation,
    voxels::{
        BlockKind, VoxelWorld,
        chunk::{CHUNK_HEIGHT, CHUNK_WIDTH},
        generators::heightmap::PerlinHeightField,
    },
};

const WORLD_RADIUS_CHUNKS: i32 = 2;
const TICKS_PER_SECOND: u64 = 60;

struct Args {
    config: Option<PathBuf>,
    ticks: u64,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut res = Args {
        config: None,
        ticks: 600,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or("--config expects a path")?;
                res.config = Some(PathBuf::from(path));
            }
            "--ticks" | "-t" => {
                let ticks = args.next().ok_or("--ticks expects a number")?;
                res.ticks = ticks.parse()?;
            }
            other => return Err(format!("Unknown argument {other}").into()),
        }
    }
    Ok(res)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    let generator = PerlinHeightField::new(&config);
    let mut voxels = VoxelWorld::new(config, Box::new(generator), MemorySink::new());
    for x in -WORLD_RADIUS_CHUNKS..WORLD_RADIUS_CHUNKS {
        for z in -WORLD_RADIUS_CHUNKS..WORLD_RADIUS_CHUNKS {
            voxels.create_or_get(x * CHUNK_WIDTH as i32, z * CHUNK_WIDTH as i32);
        }
    }

    // Spring on top of the terrain at the world center
    let surface = (0..CHUNK_HEIGHT as i32)
        .rev()
        .find(|y| voxels.get_block(IVec3::new(0, *y, 0)).is_solid())
        .unwrap_or(0);
    let spring = IVec3::new(0, surface + 1, 0);
    voxels.set_block(spring, BlockKind::Water);

    let mut sim = Simulation::new(voxels);
    sim.spawn_body(Vec3::new(4.5, surface as f32 + 10.0, 4.5), Vec3::new(0.3, 0.9, 0.3));

    info!("Running game headless for {} ticks...", args.ticks);
    sim.run(args.ticks, TICKS_PER_SECOND);
    info!(
        "{} chunks, {} liquid cells, {} vertices uploaded",
        sim.voxels().chunk_count(),
        sim.voxels().liquid_count(),
        sim.voxels().sink().total_vertices()
    );
    Ok(())
}
