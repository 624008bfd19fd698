// Prompt text for intent planning and the notes-maintenance cycle
use crate::models::IntentType;

pub const PLANNER_INSTRUCTION: &str =
    "Choose the single best next intent for the fleet given the state, notes and advisory above.";

/// System instruction for the intent planner.
pub fn planner_system_prompt() -> String {
    let valid: Vec<&str> = IntentType::ALL.iter().map(IntentType::as_str).collect();
    format!(
        "You are the strategic planner for an autonomous SpaceTraders agent.\n\
         Pick exactly one next intent. Valid intent_type values: {}.\n\
         Respond with strict JSON only, no prose and no markdown, using exactly these fields:\n\
         {{\"intent_type\": string, \"goal\": string, \"reasoning\": string, \"details\": object}}",
        valid.join(", ")
    )
}

pub const TOOL_SYSTEM_PROMPT: &str = "You are an autonomous agent playing SpaceTraders, a space trading and exploration game.

Your responsibilities:
- Maintain complete game state in your notes (ships, locations, credits, cargo, contracts)
- Choose and execute API tools strategically to grow your trading empire
- Learn from results and errors to improve your strategy
- Track timing information (ship arrivals, cooldowns, rate limits)
- Decide when to wait vs. when to act

Your notes are your memory. Always:
- Record the results of every tool call
- Track important identifiers (ship symbols, waypoint names, market symbols)
- Note wait states (ships in transit until time X, cooldown until time Y)
- Update your strategy based on what you learn

When you see errors, adjust your approach and try alternatives.";

pub const INITIAL_NOTES: &str =
    "# SpaceTraders Agent Notes\n\nNo state yet. First action: get agent info and list ships.";

pub fn advisory_merge_prompt(notes: &str, advisory: &str) -> String {
    format!(
        "You have new human guidance. Update your strategy notes to incorporate it.

CURRENT NOTES:
{notes}

HUMAN GUIDANCE:
{advisory}

Provide updated notes that incorporate this guidance while maintaining all critical game state information (ships, locations, credits, etc.)."
    )
}

pub fn tool_selection_prompt(notes: &str, history: &str, last_error: Option<&str>) -> String {
    let error_section = match last_error {
        Some(error) => format!("\nLAST ERROR:\n{error}\n"),
        None => String::new(),
    };
    format!(
        "Based on your current strategy, choose and execute ONE tool call.

CURRENT NOTES:
{notes}

RECENT HISTORY:
{history}
{error_section}
Choose a tool that advances your strategy. You can:
- Gather information (list ships, check markets, view contracts)
- Take actions (navigate, dock, refuel, trade, mine, accept contracts)
- Do NOT call 'register' - you're already registered

Call the appropriate tool now."
    )
}

pub fn result_fold_prompt(notes: &str, tool_name: &str, result: &str) -> String {
    format!(
        "Update your notes with the results of your tool call.

CURRENT NOTES:
{notes}

TOOL CALLED:
{tool_name}

RESULT:
{result}

Update your notes to include:
1. What happened (success or error)
2. New game state information from the result
3. Your next planned action
4. Any wait states (if ship is in transit, note arrival time; if cooldown, note expiry time; if rate limited, note when to retry)

Provide the complete updated notes."
    )
}
