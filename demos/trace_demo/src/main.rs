// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises the scene graph and the diagnostics
//! pipeline.
//!
//! Builds a small game-like scene (a scrolling world group, a cached HUD, and
//! a render layer that draws name tags above everything), animates it for
//! [`FRAME_COUNT`] frames, and sends trace events to both a
//! [`PrettyPrintSink`](lamina_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](lamina_debug::recorder::RecorderSink). Finishes by
//! printing the scene tree and exporting a Chrome trace JSON file.
//!
//! Set `RUST_LOG=lamina_core=trace` to see per-frame log lines as well.

use std::fs::File;
use std::io::BufWriter;

use kurbo::Rect;
use lamina_core::trace::{
    FrameSummary, GroupRebuildEvent, GroupUpdateEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};
use lamina_core::{DefaultPipes, NodeId, PipeId, Renderable, Scene, Tracer};

use lamina_debug::pretty::PrettyPrintSink;
use lamina_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 12;
const VIEW: Rect = Rect::new(0.0, 0.0, 320.0, 240.0);

/// A textured quad of fixed size.
struct Sprite {
    width: f64,
    height: f64,
}

impl Renderable for Sprite {
    fn render_pipe(&self) -> PipeId {
        PipeId(1)
    }

    fn content_bounds(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, self.width, self.height))
    }
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_group_update(&mut self, e: &GroupUpdateEvent) {
        self.pretty.on_group_update(e);
        self.recorder.on_group_update(e);
    }

    fn on_group_rebuild(&mut self, e: &GroupRebuildEvent) {
        self.pretty.on_group_rebuild(e);
        self.recorder.on_group_rebuild(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.recorder.on_frame_summary(s);
    }
}

fn sprite(scene: &mut Scene, label: &str, width: f64, height: f64) -> NodeId {
    let id = scene.create_node_with(Box::new(Sprite { width, height }));
    scene.set_label(id, label);
    id
}

fn main() {
    env_logger::init();

    // -- scene -------------------------------------------------------------
    let mut scene = Scene::new();
    let root = scene.root();
    scene.set_label(root, "stage");

    let world = scene.create_node();
    scene.set_label(world, "world");
    scene.add_child(root, world).expect("world joins the stage");
    scene.enable_render_group(world);

    let mut ships = Vec::new();
    for i in 0..4_i32 {
        let ship = sprite(&mut scene, &format!("ship-{i}"), 32.0, 24.0);
        scene.add_child(world, ship).expect("ship joins the world");
        scene.set_position(ship, (f64::from(i) * 90.0, 100.0));
        scene.set_z_index(ship, -i);
        scene.set_cullable(ship, true);

        let tag = sprite(&mut scene, &format!("tag-{i}"), 40.0, 8.0);
        scene.add_child(ship, tag).expect("tag joins its ship");
        scene.set_y(tag, -12.0);
        ships.push((ship, tag));
    }

    let hud = scene.create_node();
    scene.set_label(hud, "hud");
    scene.add_child(root, hud).expect("hud joins the stage");
    scene.set_cache_as_texture(hud, true);
    let score = sprite(&mut scene, "score", 64.0, 16.0);
    scene.add_child(hud, score).expect("score joins the hud");
    scene.set_position(score, (8.0, 8.0));

    let overlay = scene.create_render_layer();
    scene.set_label(overlay, "tags");
    scene.add_child(root, overlay).expect("overlay joins the stage");
    let tags: Vec<NodeId> = ships.iter().map(|&(_, tag)| tag).collect();
    scene.attach(overlay, &tags).expect("overlay is a layer");

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout())).quiet(true);
    let mut recorder = RecorderSink::new();
    let mut pipes = DefaultPipes;

    // -- simulated loop ----------------------------------------------------
    for frame in 0..FRAME_COUNT {
        let t = frame as f64;
        scene.set_x(world, -t * 12.0);
        for (spin, &(ship, _)) in (1_u32..).zip(&ships) {
            scene.set_rotation(ship, t * 0.05 * f64::from(spin));
        }
        if frame % 4 == 3 {
            // Score changes re-render the cached HUD texture.
            scene.mark_view_updated(score);
        }
        if frame == 6 {
            scene.set_visible(ships[0].0, false);
        }

        let report = {
            let mut tee = Tee {
                pretty: &mut pretty,
                recorder: &mut recorder,
            };
            let mut tracer = Tracer::new(&mut tee);
            scene.prepare_frame(&mut pipes, &mut tracer)
        };

        scene.cull(world, VIEW, true);
        let culled = ships.iter().filter(|&&(ship, _)| scene.culled(ship)).count();
        log::info!(
            "frame {}: rebuilt {:?}, stale textures {:?}, {culled} ships culled",
            report.frame_index,
            report.groups_rebuilt,
            report.textures_invalidated,
        );
    }

    // -- dump --------------------------------------------------------------
    println!();
    print!("{}", lamina_debug::tree::tree_string(&scene, root));
    if let Some(set) = scene.group_instructions(root) {
        println!("stage draws {} instructions", set.len());
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    lamina_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames)");
}
