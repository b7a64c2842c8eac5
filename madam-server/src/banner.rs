pub const BANNER: &str = r#"
 __  __           _                      _
|  \/  | __ _  __| | __ _ _ __ ___   ___( )___
| |\/| |/ _` |/ _` |/ _` | '_ ` _ \ / _ \// __|
| |  | | (_| | (_| | (_| | | | | | |  __/ \__ \
|_|  |_|\__,_|\__,_|\__,_|_| |_| |_|\___| |___/
"#;

pub const ENTRY: &str = r#"
Welcome to Madame's coffee corner
------------------------------------------------
Type: `order` to step up to the counter
`cards` to look at the art on the walls
`help` for commands | `quit` to leave
------------------------------------------------
"#;
