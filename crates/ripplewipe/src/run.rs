use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use compositor::{software, DistortionCompositor, DistortionParams, TextureSet, TextureSlot};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::cli::Cli;
use crate::preset::Preset;

/// Everything `run` resolves from flags and the optional preset.
struct RunConfig {
    textures: TextureSet,
    params: DistortionParams,
    size: (u32, u32),
}

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let config = resolve_config(&args)?;
    if let Some(output) = args.still.as_deref() {
        return render_still(&config, args.factor, output);
    }
    run_window(config)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merges CLI flags over the preset (when given); flags always win.
fn resolve_config(args: &Cli) -> Result<RunConfig> {
    let preset = args
        .preset
        .as_deref()
        .map(Preset::load)
        .transpose()
        .context("failed to load preset")?;

    let path_for = |flag: &Option<std::path::PathBuf>,
                    from_preset: Option<&std::path::PathBuf>,
                    slot: TextureSlot| {
        flag.clone()
            .or_else(|| from_preset.cloned())
            .ok_or_else(|| anyhow!("no {slot} image given on the command line or in the preset"))
    };

    let textures = TextureSet {
        image_a: path_for(
            &args.image_a,
            preset.as_ref().map(|p| &p.image_a),
            TextureSlot::ImageA,
        )?
        .into(),
        image_b: path_for(
            &args.image_b,
            preset.as_ref().map(|p| &p.image_b),
            TextureSlot::ImageB,
        )?
        .into(),
        displacement: path_for(
            &args.displacement,
            preset.as_ref().map(|p| &p.displacement),
            TextureSlot::Displacement,
        )?
        .into(),
    };

    let defaults = DistortionParams::default();
    let preset = preset.as_ref();
    let pick = |flag: Option<f32>, from_preset: Option<f32>, fallback: f32| {
        flag.or(from_preset).unwrap_or(fallback)
    };
    let params = DistortionParams {
        intensity_a: pick(
            args.intensity_a,
            preset.and_then(|p| p.intensity_a),
            defaults.intensity_a,
        ),
        intensity_b: pick(
            args.intensity_b,
            preset.and_then(|p| p.intensity_b),
            defaults.intensity_b,
        ),
        rotation_a: pick(
            args.angle_a,
            preset.and_then(|p| p.angle_a),
            defaults.rotation_a,
        ),
        rotation_b: pick(
            args.angle_b,
            preset.and_then(|p| p.angle_b),
            defaults.rotation_b,
        ),
        duration: args
            .duration
            .or(preset.and_then(|p| p.duration_seconds))
            .map(Duration::from_secs_f32)
            .unwrap_or(defaults.duration),
        curve: args
            .curve
            .or_else(|| preset.and_then(|p| p.curve).map(Into::into))
            .unwrap_or(defaults.curve),
    };

    Ok(RunConfig {
        textures,
        params,
        size: args.size,
    })
}

/// Renders a single frame at a fixed blend factor through the CPU path.
fn render_still(config: &RunConfig, factor: f32, output: &Path) -> Result<()> {
    let params = config.params.sanitized();
    let image_a = software::load_rgba(TextureSlot::ImageA, &config.textures.image_a)?;
    let image_b = software::load_rgba(TextureSlot::ImageB, &config.textures.image_b)?;
    let field = software::load_rgba(TextureSlot::Displacement, &config.textures.displacement)?;

    let (width, height) = config.size;
    let frame = software::composite(&params, factor, &image_a, &image_b, &field, width, height);
    frame
        .save(output)
        .with_context(|| format!("failed to write still frame to {}", output.display()))?;
    tracing::info!(path = %output.display(), factor, "wrote still frame");
    Ok(())
}

/// Opens the preview window and maps pointer enter/leave onto the
/// compositor's engage/release transitions.
fn run_window(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.size.0, config.size.1);
    let window = WindowBuilder::new()
        .with_title("ripplewipe")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create preview window")?;
    let window = Arc::new(window);

    let mut compositor = DistortionCompositor::new(
        window.as_ref(),
        window.inner_size(),
        &config.textures,
        config.params,
    )?;
    tracing::info!(width = config.size.0, height = config.size.1, "preview window ready");
    window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            // Drive redraws via vblank by waiting between events.
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::CursorEntered { .. } => {
                            compositor.engage();
                        }
                        WindowEvent::CursorLeft { .. } => {
                            compositor.release();
                        }
                        WindowEvent::Resized(new_size) => {
                            compositor.resize(new_size.width, new_size.height);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current logical size when the scale factor changes.
                            let (width, height) = compositor.size();
                            let _ = inner_size_writer
                                .request_inner_size(PhysicalSize::new(width, height));
                        }
                        WindowEvent::RedrawRequested => match compositor.render_frame() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                compositor.reconfigure_surface();
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                elwt.exit();
                            }
                            Err(other) => {
                                tracing::warn!(error = ?other, "surface error; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    // Schedule the next frame once winit is about to wait for events again.
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
