use wasm_bindgen::prelude::*;
use tripwire_engine::*;
use tripwire_gameplay::SecurityRoom;

tripwire_web::export_game!(SecurityRoom, "security-room", level);

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = include_str!("../level.json");

    #[test]
    fn bundled_level_loads() {
        let room = SecurityRoom::from_json(LEVEL).unwrap();
        assert_eq!(room.level().lasers.len(), 2);
        assert_eq!(room.level().chains.len(), 1);
    }

    #[test]
    fn bundled_level_runs() {
        let mut runner = tripwire_web::GameRunner::new(SecurityRoom::from_json(LEVEL).unwrap());
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: input::actions::keys::SPACE });
        for _ in 0..30 {
            runner.tick(1.0 / 60.0);
        }
        assert_eq!(runner.line_count(), 2);
        assert!(runner.instance_count() > 0);
    }
}
