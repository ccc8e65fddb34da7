// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! A hanging chain of linked bodies
//!
//! Small squares are linked by distance constraints below a fixed anchor
//! body, forming a chain that swings under gravity. Run with
//! `cargo run --example chain`.

use impulse2d::body::{Body, BodyId, BodyOptions};
use impulse2d::constraint::ConstraintOptions;
use impulse2d::hooks::HookRegistry;
use impulse2d::math::Vec2;
use impulse2d::world::{World, WorldOptions};

const LINK_COUNT: usize = 6;
const LINK_SIZE: f64 = 14.0;
const LINK_SPACING: f64 = 40.0;

fn main() {
    println!("impulse2d - Chain Example");
    println!("=========================\n");

    let mut world = World::new(WorldOptions::default());
    let gravity = Vec2::new(0.0, 0.4);

    // Fixed pivot above the scene
    let pivot = world.insert_body(Body::anchor(250.0, 60.0));

    // Chain links hanging below the pivot, each tied to the previous one.
    // The chain starts displaced to the right so it swings.
    let mut previous = pivot;
    let mut links: Vec<BodyId> = Vec::new();
    for index in 0..LINK_COUNT {
        let link = world.add_body(BodyOptions {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(LINK_SIZE, 0.0),
                Vec2::new(LINK_SIZE, LINK_SIZE),
                Vec2::new(0.0, LINK_SIZE),
            ],
            offset: Vec2::new(
                250.0 + (index + 1) as f64 * LINK_SPACING * 0.7,
                60.0 + (index + 1) as f64 * LINK_SPACING * 0.5,
            ),
            gravity: Some(gravity),
            friction: 0.0,
            category: 1,
            ..BodyOptions::default()
        });
        world.add_constraint(ConstraintOptions {
            body_a: Some(previous),
            body_b: Some(link),
            min_length: Some(0.0),
            max_length: Some(LINK_SPACING),
            elasticity: Some(0.1),
            ..ConstraintOptions::default()
        });
        links.push(link);
        previous = link;
    }

    println!(
        "Built a chain of {} links below the pivot at (250, 60)\n",
        LINK_COUNT
    );

    let mut hooks = HookRegistry::new();
    world.activate();

    for tick in 0..900 {
        world.update(tick as f64 * 16.0, &mut hooks);

        if tick % 300 == 299 {
            println!("After {} ticks:", tick + 1);
            for (index, &id) in links.iter().enumerate() {
                let body = world.body(id).expect("link exists");
                println!(
                    "  link{}: ({:6.1}, {:6.1})",
                    index, body.offset.x, body.offset.y
                );
            }
            println!();
        }
    }

    // The chain end never drifts further than the summed rope lengths
    let end = world.body(*links.last().expect("chain is not empty")).expect("link exists");
    let reach = Vec2::distance(Vec2::new(250.0, 60.0), end.offset);
    println!(
        "Chain end at ({:.1}, {:.1}), {:.1} from the pivot (max reach ~{:.0})",
        end.offset.x,
        end.offset.y,
        reach,
        LINK_COUNT as f64 * LINK_SPACING + 60.0
    );
}
