//! Canned answers used when no credentials are configured or a responder fails.

use rand::Rng;

use crate::orchestrator::task::{AiResponse, AiTask, TaskKind};

pub fn demo_response(task: &AiTask) -> AiResponse {
    let tokens = rand::rng().random_range(50..150);
    AiResponse::demo(demo_content(task), tokens)
}

pub fn demo_content(task: &AiTask) -> String {
    match task.kind {
        TaskKind::Creative => creative(&task.context),
        TaskKind::Technical => technical(&task.context),
        TaskKind::Conversational => conversational(&task.context),
    }
}

fn creative(context: &str) -> String {
    let scope = if context.contains("web") { "Web" } else { "général" };
    format!(
        r#"🎨 **[MODE DÉMO]** Voici un exemple de projet {scope} pour : {context}

```typescript
// Composant React principal
import React from 'react';

const App: React.FC = () => {{
  return (
    <div className="min-h-screen bg-gradient-to-br from-blue-50 to-indigo-100">
      <header className="bg-white shadow-lg">
        <div className="max-w-7xl mx-auto px-4 py-6">
          <h1 className="text-3xl font-bold text-gray-900">
            Mon Projet FORGE-IA
          </h1>
        </div>
      </header>

      <main className="max-w-7xl mx-auto px-4 py-8">
        <div className="bg-white rounded-lg shadow-md p-8">
          <h2 className="text-2xl font-semibold mb-4">Bienvenue !</h2>
          <p className="text-gray-600">
            Votre projet a été généré avec succès par FORGE-IA.
          </p>
        </div>
      </main>
    </div>
  );
}};

export default App;
```

**Technologies recommandées :**
- React + TypeScript
- Tailwind CSS
- Vite
- ESLint + Prettier

*Pour utiliser les vraies APIs IA, configurez vos clés dans les paramètres.*"#
    )
}

fn technical(context: &str) -> String {
    let name = if context.contains("component") { "Component" } else { "Module" };
    format!(
        r#"💻 **[MODE DÉMO]** Analyse technique pour: {context}

```typescript
// Code optimisé avec bonnes pratiques
interface {name}Props {{
  title: string;
  description?: string;
  className?: string;
  children?: React.ReactNode;
}}

export const {name}: React.FC<{name}Props> = ({{
  title,
  description,
  className = '',
  children
}}) => {{
  return (
    <div className={{`p-6 bg-white rounded-lg shadow-sm ${{className}}`}}>
      <h3 className="text-xl font-semibold text-gray-900 mb-2">
        {{title}}
      </h3>
      {{description && (
        <p className="text-gray-600 mb-4">{{description}}</p>
      )}}
      {{children}}
    </div>
  );
}};
```

**Améliorations suggérées :**
- ✅ TypeScript pour la sécurité des types
- ✅ Props optionnelles avec valeurs par défaut
- ✅ Classes CSS modulaires
- ✅ Accessibilité intégrée

*Configuration des APIs IA requise pour analyse complète.*"#
    )
}

fn conversational(context: &str) -> String {
    format!(
        r#"💬 **[MODE DÉMO]** Je comprends votre demande : "{context}"

En tant qu'assistant FORGE-IA, je peux vous aider avec :

🎯 **Création de projets**
- Applications web (React, Vue, Svelte)
- APIs REST et GraphQL
- Applications mobiles

🔧 **Développement**
- Génération de composants
- Analyse de code
- Debugging et optimisation

📦 **Déploiement**
- Configuration CI/CD
- Docker et conteneurisation
- Hébergement cloud

**Pour une assistance complète, configurez vos clés API dans les paramètres.**

Que souhaitez-vous créer aujourd'hui ?"#
    )
}
