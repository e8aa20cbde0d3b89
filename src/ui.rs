use crate::models::ProgramView;

pub fn render_index(view: &ProgramView) -> String {
    let initial = serde_json::to_string(view)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    INDEX_HTML
        .replace("{{THEME_CLASS}}", if view.dark_mode { "dark" } else { "" })
        .replace("{{GRADIENT_FROM}}", &view.preferences.gradient_from)
        .replace("{{GRADIENT_TO}}", &view.preferences.gradient_to)
        .replace("{{INITIAL_STATE}}", &initial)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{THEME_CLASS}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Rise Reset</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Poppins:wght@400;600;700&display=swap');

    :root {
      --from: {{GRADIENT_FROM}};
      --to: {{GRADIENT_TO}};
      --card: rgba(255, 255, 255, 0.12);
      --field: rgba(255, 255, 255, 0.1);
      --button: rgba(255, 255, 255, 0.2);
      --ink: #ffffff;
    }

    html.dark {
      --card: rgba(15, 23, 42, 0.35);
      --field: rgba(15, 23, 42, 0.3);
      --button: rgba(15, 23, 42, 0.4);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      padding: 16px;
      color: var(--ink);
      font-family: "Poppins", "Trebuchet MS", sans-serif;
      background: linear-gradient(135deg, var(--from), var(--to));
      transition: background 400ms ease;
    }

    .app {
      max-width: 36rem;
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    h1 {
      font-size: 1.9rem;
      margin: 0;
    }

    .controls {
      display: flex;
      gap: 8px;
    }

    button,
    select {
      font: inherit;
      color: inherit;
      background: var(--button);
      border: none;
      border-radius: 8px;
      padding: 6px 14px;
      cursor: pointer;
    }

    button:hover {
      filter: brightness(1.15);
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    input[type="text"],
    textarea {
      width: 100%;
      font: inherit;
      color: inherit;
      background: var(--field);
      border: none;
      border-radius: 8px;
      padding: 8px;
    }

    input::placeholder,
    textarea::placeholder {
      color: rgba(255, 255, 255, 0.7);
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(14px);
      border-radius: 18px;
      padding: 16px;
      display: grid;
      gap: 16px;
    }

    .hidden {
      display: none;
    }

    .bar {
      width: 100%;
      height: 8px;
      border-radius: 4px;
      background: rgba(255, 255, 255, 0.2);
      overflow: hidden;
    }

    .bar > div {
      height: 100%;
      background: #ffffff;
      transition: width 300ms ease;
    }

    .habit {
      background: var(--field);
      padding: 8px;
      border-radius: 8px;
    }

    .stack {
      display: grid;
      gap: 8px;
    }

    label {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .history li {
      margin-bottom: 6px;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status.error {
      color: #fee2e2;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Rise Reset</h1>
      <div class="controls">
        <button id="theme-toggle" type="button"></button>
        <select id="gradient">
          <option value="sunrise">Sunrise</option>
          <option value="focus">Focus</option>
          <option value="energize">Energize</option>
        </select>
      </div>
    </header>

    <section id="setup" class="stack hidden">
      <p>Set your 3 reset habits:</p>
      <input type="text" data-habit="0" placeholder="Habit 1" />
      <input type="text" data-habit="1" placeholder="Habit 2" />
      <input type="text" data-habit="2" placeholder="Habit 3" />
      <button id="begin" type="button">Start Reset</button>
    </section>

    <section id="day" class="card hidden">
      <h2 id="day-title"></h2>
      <div class="bar"><div id="progress"></div></div>

      <div class="stack">
        <strong>Did you complete your habits?</strong>
        <div id="habits" class="stack"></div>
      </div>

      <div class="stack">
        <strong>Challenges:</strong>
        <label><input type="checkbox" data-challenge="coldShower" /> Cold Shower</label>
        <label><input type="checkbox" data-challenge="earlyWake" /> Early Wake</label>
      </div>

      <div class="stack">
        <strong>Reflection:</strong>
        <textarea id="journal" rows="3" placeholder="What did you learn today?"></textarea>
      </div>

      <button id="commit" type="button">Mark Day Complete</button>
    </section>

    <section id="complete" class="card hidden">
      <h2>All 66 days logged</h2>
      <div class="bar"><div style="width: 100%"></div></div>
    </section>

    <section id="log" class="card hidden">
      <strong>Logged days</strong>
      <ol id="history" class="history"></ol>
    </section>

    <p id="status" class="status"></p>
  </main>

  <script>
    let view = {{INITIAL_STATE}};
    let draftTimer = null;

    const $ = (id) => document.getElementById(id);
    const habitInputs = document.querySelectorAll('[data-habit]');
    const challengeInputs = document.querySelectorAll('[data-challenge]');

    const setStatus = (message, tone) => {
      const status = $('status');
      status.textContent = message;
      status.className = `status ${tone || ''}`;
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      view = await res.json();
      render();
    };

    const send = (action) => post('/api/action', action).catch((err) => setStatus(err.message, 'error'));

    const renderPreferences = () => {
      const prefs = view.preferences;
      document.documentElement.classList.toggle('dark', view.dark_mode);
      document.documentElement.style.setProperty('--from', prefs.gradient_from);
      document.documentElement.style.setProperty('--to', prefs.gradient_to);
      $('theme-toggle').textContent = view.dark_mode ? '☀️ Light' : '🌙 Dark';
      $('gradient').value = prefs.gradient;
    };

    const renderHistory = () => {
      const list = $('history');
      list.replaceChildren();
      view.program.entries.forEach((entry, index) => {
        if (!entry) {
          return;
        }
        const item = document.createElement('li');
        const flags = [
          entry.challenges.coldShower ? 'cold shower' : null,
          entry.challenges.earlyWake ? 'early wake' : null
        ].filter(Boolean).join(', ');
        const when = new Date(entry.date).toLocaleDateString();
        item.textContent = `Day ${index + 1} (${when})${flags ? ' · ' + flags : ''}${entry.journal ? ': ' + entry.journal : ''}`;
        list.appendChild(item);
      });
      $('log').classList.toggle('hidden', list.children.length === 0);
    };

    const render = () => {
      renderPreferences();

      $('setup').classList.toggle('hidden', view.phase !== 'setup');
      $('day').classList.toggle('hidden', view.phase !== 'in_progress');
      $('complete').classList.toggle('hidden', view.phase !== 'complete');

      habitInputs.forEach((input) => {
        const value = view.program.habits[Number(input.dataset.habit)];
        if (document.activeElement !== input) {
          input.value = value;
        }
      });

      $('day-title').textContent = `Day ${view.day} of ${view.days_total}`;
      $('progress').style.width = `${view.progress}%`;

      const habits = $('habits');
      habits.replaceChildren();
      view.program.habits.forEach((habit) => {
        const row = document.createElement('div');
        row.className = 'habit';
        row.textContent = `✅ ${habit}`;
        habits.appendChild(row);
      });

      challengeInputs.forEach((input) => {
        input.checked = view.program.challenges[input.dataset.challenge];
      });

      if (document.activeElement !== $('journal')) {
        $('journal').value = view.journal_draft;
      }

      renderHistory();
    };

    habitInputs.forEach((input) => {
      input.addEventListener('change', () => {
        send({ type: 'set_habit_label', index: Number(input.dataset.habit), text: input.value });
      });
    });

    challengeInputs.forEach((input) => {
      input.addEventListener('change', () => {
        send({ type: 'set_challenge_flag', challenge: input.dataset.challenge, value: input.checked });
      });
    });

    $('journal').addEventListener('input', () => {
      clearTimeout(draftTimer);
      draftTimer = setTimeout(() => send({ type: 'set_journal_draft', text: $('journal').value }), 300);
    });

    $('begin').addEventListener('click', async () => {
      for (const input of habitInputs) {
        await send({ type: 'set_habit_label', index: Number(input.dataset.habit), text: input.value });
      }
      await send({ type: 'begin_program' });
    });

    $('commit').addEventListener('click', async () => {
      clearTimeout(draftTimer);
      setStatus('Saving...', 'info');
      await post('/api/action', { type: 'commit_day', journal: $('journal').value })
        .then(() => {
          $('journal').value = '';
          setStatus('Saved', 'ok');
          setTimeout(() => setStatus('', ''), 1200);
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    $('theme-toggle').addEventListener('click', () => {
      const theme = view.dark_mode ? 'light' : 'dark';
      post('/api/preferences', { key: 'theme', value: theme }).catch((err) => setStatus(err.message, 'error'));
    });

    $('gradient').addEventListener('change', (event) => {
      post('/api/preferences', { key: 'gradient', value: event.target.value })
        .catch((err) => setStatus(err.message, 'error'));
    });

    if (view) {
      render();
    } else {
      fetch('/api/state')
        .then((res) => res.json())
        .then((data) => {
          view = data;
          render();
        })
        .catch((err) => setStatus(err.message, 'error'));
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgramState;
    use crate::program::set_habit_label;
    use crate::state::Session;
    use crate::storage::LocalStore;

    fn script_of(page: &str) -> &str {
        let start = page.find("<script>").expect("script start") + "<script>".len();
        let end = page.rfind("</script>").expect("script end");
        &page[start..end]
    }

    #[test]
    fn markup_in_habit_labels_stays_inside_the_script() {
        let mut session = Session::new(LocalStore::in_memory());
        session.program =
            set_habit_label(&ProgramState::default(), 0, "<!--<script>").unwrap();
        session.program = set_habit_label(&session.program, 1, "a </script> & b").unwrap();

        let page = render_index(&session.view());
        let script = script_of(&page);

        assert!(!script.contains("<!--"));
        assert!(!script.contains("<script"));
        assert!(!script.contains("</script"));
        assert!(script.contains(r"\u003c!--\u003cscript\u003e"));
        assert!(script.contains(r"a \u003c/script\u003e \u0026 b"));
    }

    #[test]
    fn embedded_state_is_still_valid_json() {
        let mut session = Session::new(LocalStore::in_memory());
        session.program = set_habit_label(&ProgramState::default(), 2, "<b>Walk & talk</b>").unwrap();

        let page = render_index(&session.view());
        let line = script_of(&page)
            .lines()
            .find_map(|line| line.trim().strip_prefix("let view = "))
            .expect("initial state line");
        let value: serde_json::Value =
            serde_json::from_str(line.trim_end_matches(';')).unwrap();
        assert_eq!(value["program"]["habits"][2], "<b>Walk & talk</b>");
    }
}
