//! The form shared by the add and edit transaction pages.

use maud::{Markup, html};

use crate::{
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_errors,
    },
    transaction::{
        FieldErrors, TransactionField, TransactionKind,
        validation::{DESCRIPTION_MAX_LENGTH, TransactionForm},
    },
};

/// What to fill the form inputs with.
pub struct TransactionFormValues<'a> {
    pub description: &'a str,
    pub amount: &'a str,
    /// The kind to select. The kind inputs are only shown when this is set.
    pub kind: Option<TransactionKind>,
}

impl<'a> TransactionFormValues<'a> {
    /// Fill the form with what the user submitted, falling back to
    /// `current_kind` when the submitted kind is missing or invalid.
    pub fn from_submission(
        form: &'a TransactionForm,
        current_kind: Option<TransactionKind>,
    ) -> Self {
        let kind = form
            .kind
            .as_deref()
            .and_then(|kind| kind.parse().ok())
            .or(current_kind);

        Self {
            description: &form.description,
            amount: &form.amount,
            kind,
        }
    }
}

pub fn transaction_form(
    action: &str,
    submit_label: &str,
    values: &TransactionFormValues<'_>,
    errors: &FieldErrors,
) -> Markup {
    html! {
        form method="post" action=(action) class="w-full space-y-4 md:space-y-6"
        {
            @if let Some(selected_kind) = values.kind {
                (kind_fieldset(selected_kind, errors))
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    maxlength=(DESCRIPTION_MAX_LENGTH)
                    required
                    autofocus
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_errors(&errors.messages_for(TransactionField::Description)))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    required
                    value=(values.amount)
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_errors(&errors.messages_for(TransactionField::Amount)))
            }

            button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

fn kind_fieldset(selected_kind: TransactionKind, errors: &FieldErrors) -> Markup {
    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Kind" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for kind in [TransactionKind::Income, TransactionKind::Expense] {
                    @let input_id = format!("kind-{kind}");

                    div class="flex items-center gap-3"
                    {
                        input
                            name="kind"
                            id=(input_id)
                            type="radio"
                            value=(kind.as_str())
                            checked[kind == selected_kind]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(input_id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
                    }
                }
            }

            (field_errors(&errors.messages_for(TransactionField::Kind)))
        }
    }
}
