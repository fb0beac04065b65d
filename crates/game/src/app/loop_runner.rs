use std::process::ExitCode;

use dungeon_engine::{clock_for, run_headless, RoomId, SessionState, Simulation};
use tracing::info;

use super::ascii::render_frame;
use super::bootstrap::AppWiring;

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let mut clock = clock_for(&app.config);
    let mut shown_room: Option<RoomId> = None;
    let mut show_room_on_entry = |simulation: &Simulation| {
        let room_id = simulation.current_room_id();
        if shown_room != Some(room_id) {
            shown_room = Some(room_id);
            println!("{}", render_frame(simulation));
        }
    };

    let summary = run_headless(
        &app.config,
        &mut app.simulation,
        &mut app.input,
        clock.as_mut(),
        Some(&mut show_room_on_entry),
    );

    println!("{}", render_frame(&app.simulation));
    println!(
        "{} after {} ticks: room {}, score {}, health {}",
        summary.final_state, summary.ticks, summary.room_id, summary.score, summary.health
    );
    info!(
        script_finished = app.input.is_finished(),
        "headless_run_complete"
    );

    match summary.final_state {
        SessionState::GameOver => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    }
}
